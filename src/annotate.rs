//! Default instruction annotator.
//!
//! Marks departure, intermediate stops and arrival, and flags sharp bearing
//! changes along the leg geometry as turns. Real guidance (lanes,
//! roundabouts, street names) belongs to a dedicated annotator.

use crate::route::{Instruction, Maneuver, RouteResult};
use crate::traits::InstructionAnnotator;

/// Bearing change, in degrees, above which a geometry vertex is a turn.
const DEFAULT_TURN_THRESHOLD_DEG: f64 = 45.0;

#[derive(Debug, Clone)]
pub struct WaypointAnnotator {
    pub turn_threshold_deg: f64,
}

impl Default for WaypointAnnotator {
    fn default() -> Self {
        Self {
            turn_threshold_deg: DEFAULT_TURN_THRESHOLD_DEG,
        }
    }
}

impl InstructionAnnotator for WaypointAnnotator {
    fn annotate(&self, route: &RouteResult) -> Vec<Vec<Instruction>> {
        let last_leg = route.legs.len().saturating_sub(1);

        route
            .legs
            .iter()
            .enumerate()
            .map(|(i, leg)| {
                let points = leg.geometry.points();
                let mut instructions = Vec::new();

                instructions.push(if i == 0 {
                    instruction(Maneuver::Depart, 0, format!("Depart from stop {}", leg.from))
                } else {
                    instruction(Maneuver::Waypoint, 0, format!("Continue from stop {}", leg.from))
                });

                for vertex in 1..points.len().saturating_sub(1) {
                    let before = bearing(points[vertex - 1], points[vertex]);
                    let after = bearing(points[vertex], points[vertex + 1]);
                    let delta = normalize(after - before);
                    if delta.abs() >= self.turn_threshold_deg {
                        let side = if delta > 0.0 { "right" } else { "left" };
                        instructions.push(instruction(Maneuver::Turn, vertex, format!("Turn {}", side)));
                    }
                }

                let end = points.len().saturating_sub(1);
                instructions.push(if i == last_leg {
                    instruction(Maneuver::Arrive, end, format!("Arrive back at stop {}", leg.to))
                } else {
                    instruction(Maneuver::Waypoint, end, format!("Reach stop {}", leg.to))
                });

                instructions
            })
            .collect()
    }
}

fn instruction(maneuver: Maneuver, point: usize, text: String) -> Instruction {
    Instruction {
        maneuver,
        point,
        text,
    }
}

/// Initial compass bearing from `from` to `to`, degrees clockwise from north.
fn bearing(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lat2) = (from.0.to_radians(), to.0.to_radians());
    let delta_lng = (to.1 - from.1).to_radians();
    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();
    y.atan2(x).to_degrees()
}

/// Maps an angle difference into (-180, 180].
fn normalize(delta: f64) -> f64 {
    let wrapped = delta.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}
