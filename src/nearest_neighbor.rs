//! Greedy nearest-neighbour tour construction.
//!
//! From the start, repeatedly move to the cheapest unvisited location that is
//! not known to be isolated. Ties go to the lowest index so runs are
//! reproducible. When no reachable location remains, everything still
//! unvisited is marked isolated and the partial tour is returned.
//!
//! # Complexity
//!
//! O(n²) per start.

use crate::error::Result;
use crate::matrix::CostMatrix;
use crate::reachability::ReachabilityCache;
use crate::strategy::{ensure_viable_start, exhaust_remaining, finish, TourCandidate, TourStrategy};

#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbor;

impl TourStrategy for NearestNeighbor {
    fn name(&self) -> &'static str {
        "nearest_neighbor"
    }

    fn build(
        &self,
        start: usize,
        matrix: &CostMatrix,
        reachability: &ReachabilityCache,
    ) -> Result<TourCandidate> {
        ensure_viable_start(start, matrix, reachability)?;

        let n = matrix.size();
        let mut visited = vec![false; n];
        visited[start] = true;
        let mut order = Vec::with_capacity(n);
        order.push(start);
        let mut current = start;

        for _ in 1..n {
            match nearest_unvisited(current, matrix, &visited, reachability) {
                Some(next) => {
                    visited[next] = true;
                    order.push(next);
                    current = next;
                }
                None => {
                    exhaust_remaining(&visited, reachability);
                    break;
                }
            }
        }

        finish(start, order, matrix)
    }
}

/// Cheapest reachable, unvisited, non-isolated successor of `current`.
fn nearest_unvisited(
    current: usize,
    matrix: &CostMatrix,
    visited: &[bool],
    reachability: &ReachabilityCache,
) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (index, cost) in matrix.row(current).iter().enumerate() {
        let Some(cost) = *cost else { continue };
        if visited[index] || reachability.is_isolated(index) {
            continue;
        }
        // Strict comparison keeps the lowest index on ties.
        if best.is_none_or(|(_, best_cost)| cost < best_cost) {
            best = Some((index, cost));
        }
    }
    best.map(|(index, _)| index)
}
