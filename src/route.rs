//! Assembled route output.

use serde::{Deserialize, Serialize};

use crate::polyline::Polyline;

/// Shortest-path answer for an ordered list of waypoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    /// Routing weight in the same unit as the cost matrix.
    pub cost: u64,
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
    pub geometry: Polyline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Maneuver {
    Depart,
    Waypoint,
    Arrive,
    Turn,
}

/// Human-readable guidance attached to a point of a leg's geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub maneuver: Maneuver,
    /// Index into the leg geometry the instruction applies to.
    pub point: usize,
    pub text: String,
}

/// One routed segment between two consecutive tour stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub from: usize,
    pub to: usize,
    pub cost: u64,
    pub distance: f64,
    pub duration: f64,
    pub geometry: Polyline,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instructions: Vec<Instruction>,
}

impl Leg {
    pub fn new(from: usize, to: usize, path: PathResult) -> Self {
        Self {
            from,
            to,
            cost: path.cost,
            distance: path.distance,
            duration: path.duration,
            geometry: path.geometry,
            instructions: Vec::new(),
        }
    }
}

/// A complete closed route over a tour. Immutable once assembled; annotation
/// produces a new value and never touches geometry or totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub total_cost: u64,
    pub total_distance: f64,
    pub total_duration: f64,
    pub legs: Vec<Leg>,
    /// Visiting order the legs follow.
    pub permutation: Vec<usize>,
}

impl RouteResult {
    pub fn from_legs(legs: Vec<Leg>, permutation: Vec<usize>) -> Self {
        Self {
            total_cost: legs.iter().map(|leg| leg.cost).sum(),
            total_distance: legs.iter().map(|leg| leg.distance).sum(),
            total_duration: legs.iter().map(|leg| leg.duration).sum(),
            legs,
            permutation,
        }
    }

    /// Full route geometry with shared leg endpoints collapsed.
    pub fn geometry(&self) -> Polyline {
        let mut geometry = Polyline::default();
        for leg in &self.legs {
            geometry.extend(&leg.geometry);
        }
        geometry
    }

    /// Returns a copy with per-leg instructions attached.
    ///
    /// Extra instruction lists are ignored; legs without one keep theirs.
    pub fn with_instructions(&self, instructions: Vec<Vec<Instruction>>) -> Self {
        let mut annotated = self.clone();
        for (leg, leg_instructions) in annotated.legs.iter_mut().zip(instructions) {
            leg.instructions = leg_instructions;
        }
        annotated
    }
}
