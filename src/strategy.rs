//! Pluggable tour construction.
//!
//! The selector only sees [`TourStrategy`]; heuristics are chosen through
//! [`StrategyKind`] in the trip options.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TripError};
use crate::farthest_insertion::FarthestInsertion;
use crate::matrix::CostMatrix;
use crate::nearest_neighbor::NearestNeighbor;
use crate::reachability::{ReachabilityCache, ReachabilityStatus};
use crate::tour::Tour;

/// A visiting order and the matrix cost of the edges it takes.
///
/// `estimated_cost` excludes the return-to-start edge; the assembler routes
/// that leg separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourCandidate {
    pub tour: Tour,
    pub estimated_cost: u64,
}

pub trait TourStrategy: Sync {
    fn name(&self) -> &'static str;

    /// Builds a tour beginning at `start`.
    ///
    /// Fails with [`TripError::NoViableStart`] if `start` is isolated or
    /// nothing else could be reached from it. May return a partial tour
    /// when some locations turn out to be unreachable.
    fn build(
        &self,
        start: usize,
        matrix: &CostMatrix,
        reachability: &ReachabilityCache,
    ) -> Result<TourCandidate>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    NearestNeighbor,
    FarthestInsertion,
}

impl StrategyKind {
    pub fn strategy(self) -> &'static dyn TourStrategy {
        match self {
            StrategyKind::NearestNeighbor => &NearestNeighbor,
            StrategyKind::FarthestInsertion => &FarthestInsertion,
        }
    }
}

/// Shared precondition: an isolated start fails before any work is done.
pub(crate) fn ensure_viable_start(
    start: usize,
    matrix: &CostMatrix,
    reachability: &ReachabilityCache,
) -> Result<()> {
    if reachability.classify(start, matrix) == ReachabilityStatus::Isolated {
        return Err(TripError::NoViableStart { start });
    }
    Ok(())
}

/// Marks every location not in `included` as isolated.
pub(crate) fn exhaust_remaining(included: &[bool], reachability: &ReachabilityCache) {
    let unvisited = included
        .iter()
        .enumerate()
        .filter(|(_, included)| !**included)
        .map(|(index, _)| index);
    reachability.mark_exhausted(unvisited);
}

/// Wraps a finished order into a candidate, rejecting lone-stop tours.
pub(crate) fn finish(start: usize, order: Vec<usize>, matrix: &CostMatrix) -> Result<TourCandidate> {
    if order.len() < 2 && matrix.size() >= 2 {
        return Err(TripError::NoViableStart { start });
    }
    let tour = Tour::from_order(order, matrix.size());
    let estimated_cost = tour.path_cost(matrix);
    Ok(TourCandidate {
        tour,
        estimated_cost,
    })
}
