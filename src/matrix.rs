//! Directed travel-cost matrix.
//!
//! Costs are non-negative integers. Unreachable pairs are stored as `None`
//! rather than a numeric sentinel, so a genuine zero-cost edge stays usable.

use crate::error::OracleError;

/// Raw-input sentinel for "unreachable" accepted by [`CostMatrix::from_raw`].
pub const UNREACHABLE: u32 = u32::MAX;

/// Square N×N matrix where `get(i, j)` is the cost of travelling from `i` to `j`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostMatrix {
    size: usize,
    data: Vec<Option<u32>>,
}

impl CostMatrix {
    /// Matrix of the given size with every off-diagonal pair unreachable.
    pub fn unreachable(size: usize) -> Self {
        let mut data = vec![None; size * size];
        for i in 0..size {
            data[i * size + i] = Some(0);
        }
        Self { size, data }
    }

    /// Builds a matrix from row vectors, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<Option<u32>>>) -> Result<Self, OracleError> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(OracleError::malformed(format!(
                    "row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    size
                )));
            }
            data.extend(row);
        }
        Ok(Self { size, data })
    }

    /// Builds a matrix from a flat row-major buffer that uses [`UNREACHABLE`]
    /// for missing edges.
    pub fn from_raw(size: usize, raw: &[u32]) -> Result<Self, OracleError> {
        if raw.len() != size * size {
            return Err(OracleError::malformed(format!(
                "{} entries for a {}x{} matrix",
                raw.len(),
                size,
                size
            )));
        }
        let data = raw
            .iter()
            .map(|&cost| if cost == UNREACHABLE { None } else { Some(cost) })
            .collect();
        Ok(Self { size, data })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Cost from `from` to `to`, or `None` when unreachable.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> Option<u32> {
        assert!(from < self.size && to < self.size, "index out of bounds");
        self.data[from * self.size + to]
    }

    pub fn set(&mut self, from: usize, to: usize, cost: Option<u32>) {
        assert!(from < self.size && to < self.size, "index out of bounds");
        self.data[from * self.size + to] = cost;
    }

    /// Outgoing costs of `from`, indexed by destination.
    pub fn row(&self, from: usize) -> &[Option<u32>] {
        &self.data[from * self.size..(from + 1) * self.size]
    }

    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        self.get(from, to).is_some()
    }
}
