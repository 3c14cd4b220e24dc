//! Farthest-insertion tour construction.
//!
//! 1. Pair the start with the location farthest from it to form a 2-stop circuit.
//! 2. Pick the unplaced location whose cheapest connection from the circuit is
//!    the most expensive.
//! 3. Insert it between the two consecutive stops where it adds the least cost.
//! 4. Repeat until every reachable location is placed.
//!
//! Directed costs are respected: an insertion between `a` and `b` needs both
//! `a → x` and `x → b` to exist. If the farthest location has no feasible
//! slot the next-farthest is tried; when nothing left can be placed, the
//! remainder is marked isolated and the partial tour is returned.
//!
//! # Complexity
//!
//! O(n³) per start.

use std::cmp::Reverse;

use crate::error::Result;
use crate::matrix::CostMatrix;
use crate::reachability::ReachabilityCache;
use crate::strategy::{ensure_viable_start, exhaust_remaining, finish, TourCandidate, TourStrategy};

#[derive(Debug, Clone, Copy, Default)]
pub struct FarthestInsertion;

impl TourStrategy for FarthestInsertion {
    fn name(&self) -> &'static str {
        "farthest_insertion"
    }

    fn build(
        &self,
        start: usize,
        matrix: &CostMatrix,
        reachability: &ReachabilityCache,
    ) -> Result<TourCandidate> {
        ensure_viable_start(start, matrix, reachability)?;

        let n = matrix.size();
        let mut placed = vec![false; n];
        placed[start] = true;
        let mut circuit = Vec::with_capacity(n);
        circuit.push(start);

        match initial_partner(start, matrix, &placed, reachability) {
            Some(partner) => {
                placed[partner] = true;
                circuit.push(partner);
            }
            None => {
                exhaust_remaining(&placed, reachability);
                return finish(start, circuit, matrix);
            }
        }

        while circuit.len() < n {
            match next_insertion(&circuit, matrix, &placed, reachability) {
                Some((location, slot)) => {
                    placed[location] = true;
                    circuit.insert(slot + 1, location);
                }
                None => {
                    exhaust_remaining(&placed, reachability);
                    break;
                }
            }
        }

        // Insertions always land after slot 0, so the start stays first.
        finish(start, circuit, matrix)
    }
}

/// Farthest location reachable from `start`, preferring ones that can also
/// return to it. Ties go to the lowest index.
fn initial_partner(
    start: usize,
    matrix: &CostMatrix,
    placed: &[bool],
    reachability: &ReachabilityCache,
) -> Option<usize> {
    let candidates = || {
        matrix
            .row(start)
            .iter()
            .enumerate()
            .filter(|(index, _)| !placed[*index] && !reachability.is_isolated(*index))
            .filter_map(|(index, cost)| cost.map(|cost| (index, cost)))
    };

    let farthest = |round_trip_only: bool| {
        candidates()
            .filter(|(index, _)| !round_trip_only || matrix.is_reachable(*index, start))
            .max_by_key(|&(index, cost)| (cost, Reverse(index)))
            .map(|(index, _)| index)
    };

    farthest(true).or_else(|| farthest(false))
}

/// Chooses the next location to place and the circuit slot to place it after.
fn next_insertion(
    circuit: &[usize],
    matrix: &CostMatrix,
    placed: &[bool],
    reachability: &ReachabilityCache,
) -> Option<(usize, usize)> {
    let mut by_distance: Vec<(usize, u32)> = (0..matrix.size())
        .filter(|&index| !placed[index] && !reachability.is_isolated(index))
        .filter_map(|index| distance_from_circuit(circuit, index, matrix).map(|d| (index, d)))
        .collect();
    by_distance.sort_by_key(|&(index, distance)| (Reverse(distance), index));

    by_distance
        .into_iter()
        .find_map(|(index, _)| cheapest_slot(circuit, index, matrix).map(|slot| (index, slot)))
}

/// Cheapest cost of reaching `location` from any stop already in the circuit.
fn distance_from_circuit(circuit: &[usize], location: usize, matrix: &CostMatrix) -> Option<u32> {
    circuit
        .iter()
        .filter_map(|&stop| matrix.get(stop, location))
        .min()
}

/// Slot `i` means inserting between `circuit[i]` and its successor.
fn cheapest_slot(circuit: &[usize], location: usize, matrix: &CostMatrix) -> Option<usize> {
    let len = circuit.len();
    let mut best: Option<(usize, i64)> = None;
    for i in 0..len {
        let a = circuit[i];
        let b = circuit[(i + 1) % len];
        let (Some(into), Some(out)) = (matrix.get(a, location), matrix.get(location, b)) else {
            continue;
        };
        let removed = matrix.get(a, b).unwrap_or(0);
        let delta = i64::from(into) + i64::from(out) - i64::from(removed);
        if best.is_none_or(|(_, best_delta)| delta < best_delta) {
            best = Some((i, delta));
        }
    }
    best.map(|(slot, _)| slot)
}
