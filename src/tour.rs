//! Closed visiting order over the query's locations.

use crate::error::{Result, TripError};
use crate::matrix::CostMatrix;

/// Penalty charged for an unreachable edge when estimating from the matrix.
const UNREACHABLE_PENALTY: u64 = u32::MAX as u64;

/// Ordered, duplicate-free sequence of location indices in `[0, size)`.
///
/// The return to the first stop is implicit. A tour shorter than `size` is
/// partial: the missing locations were unreachable when it was built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tour {
    order: Vec<usize>,
    size: usize,
}

impl Tour {
    /// Validates `order` as a (possibly partial) permutation of `[0, size)`.
    pub fn new(order: Vec<usize>, size: usize) -> Result<Self> {
        let mut seen = vec![false; size];
        for &index in &order {
            if index >= size {
                return Err(TripError::invalid_input(
                    Some(index),
                    format!("tour index {} out of range for {} locations", index, size),
                ));
            }
            if seen[index] {
                return Err(TripError::invalid_input(
                    Some(index),
                    format!("location {} appears twice in tour", index),
                ));
            }
            seen[index] = true;
        }
        Ok(Self { order, size })
    }

    /// Builds a tour from strategy output that already upholds the invariant.
    pub(crate) fn from_order(order: Vec<usize>, size: usize) -> Self {
        debug_assert!(Self::new(order.clone(), size).is_ok());
        Self { order, size }
    }

    pub fn stops(&self) -> &[usize] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of locations in the query, visited or not.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn start(&self) -> Option<usize> {
        self.order.first().copied()
    }

    pub fn is_complete(&self) -> bool {
        self.order.len() == self.size
    }

    /// Consecutive stop pairs, including the wrap-around back to the start.
    pub fn legs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.order.len();
        (0..n).map(move |i| (self.order[i], self.order[(i + 1) % n]))
    }

    /// Visiting position of each location; `None` for locations left out.
    pub fn positions(&self) -> Vec<Option<usize>> {
        let mut positions = vec![None; self.size];
        for (position, &index) in self.order.iter().enumerate() {
            positions[index] = Some(position);
        }
        positions
    }

    /// Matrix cost of the open path, without the return edge.
    pub fn path_cost(&self, matrix: &CostMatrix) -> u64 {
        self.order
            .windows(2)
            .map(|pair| edge_cost(matrix, pair[0], pair[1]))
            .sum()
    }

    /// Matrix cost of the closed circuit.
    pub fn circuit_cost(&self, matrix: &CostMatrix) -> u64 {
        if self.order.len() < 2 {
            return 0;
        }
        self.legs().map(|(from, to)| edge_cost(matrix, from, to)).sum()
    }

    /// Rotates the circuit so it begins at `start`. No-op if `start` is absent.
    pub fn rotate_to(&mut self, start: usize) {
        if let Some(position) = self.order.iter().position(|&index| index == start) {
            self.order.rotate_left(position);
        }
    }
}

fn edge_cost(matrix: &CostMatrix, from: usize, to: usize) -> u64 {
    matrix
        .get(from, to)
        .map(u64::from)
        .unwrap_or(UNREACHABLE_PENALTY)
}
