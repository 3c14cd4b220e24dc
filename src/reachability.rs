//! Reachability classification of tour start candidates.
//!
//! A location is `Isolated` when every other location is unreachable from it
//! in the cost matrix. Results are cached for the lifetime of one query;
//! `Isolated` is terminal because the matrix never changes mid-query.

use std::sync::RwLock;

use crate::matrix::CostMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReachabilityStatus {
    Unknown,
    Isolated,
    Connected,
}

/// Scans row `start` of the matrix without consulting any cache.
///
/// A single-location matrix has no other location to reach, so its only
/// row is vacuously isolated.
pub fn classify(start: usize, matrix: &CostMatrix) -> ReachabilityStatus {
    let unreachable = matrix
        .row(start)
        .iter()
        .enumerate()
        .filter(|&(to, cost)| to != start && cost.is_none())
        .count();

    if unreachable >= matrix.size().saturating_sub(1) {
        ReachabilityStatus::Isolated
    } else {
        ReachabilityStatus::Connected
    }
}

/// Per-query reachability cache shared by every start trial.
///
/// Guarded by a read-mostly lock so parallel trials can share it.
#[derive(Debug)]
pub struct ReachabilityCache {
    statuses: RwLock<Vec<ReachabilityStatus>>,
}

impl ReachabilityCache {
    pub fn new(size: usize) -> Self {
        Self {
            statuses: RwLock::new(vec![ReachabilityStatus::Unknown; size]),
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn status(&self, index: usize) -> ReachabilityStatus {
        self.read()[index]
    }

    pub fn is_isolated(&self, index: usize) -> bool {
        self.status(index) == ReachabilityStatus::Isolated
    }

    /// Memoized [`classify`]: a cached result is returned without rescanning.
    pub fn classify(&self, start: usize, matrix: &CostMatrix) -> ReachabilityStatus {
        let cached = self.status(start);
        if cached != ReachabilityStatus::Unknown {
            return cached;
        }

        let status = classify(start, matrix);
        let mut statuses = self.write();
        // Another trial may have isolated this index while we scanned.
        if statuses[start] == ReachabilityStatus::Unknown {
            statuses[start] = status;
        }
        statuses[start]
    }

    /// Records that a tour construction ran out of reachable neighbours:
    /// every index it left unvisited is isolated for the rest of the query.
    pub fn mark_exhausted(&self, unvisited: impl IntoIterator<Item = usize>) {
        let mut statuses = self.write();
        for index in unvisited {
            if statuses[index] != ReachabilityStatus::Isolated {
                tracing::debug!(index, "location exhausted during construction, marking isolated");
                statuses[index] = ReachabilityStatus::Isolated;
            }
        }
    }

    /// Indices currently known to be isolated, ascending.
    pub fn isolated(&self) -> Vec<usize> {
        self.read()
            .iter()
            .enumerate()
            .filter(|(_, status)| **status == ReachabilityStatus::Isolated)
            .map(|(index, _)| index)
            .collect()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<ReachabilityStatus>> {
        self.statuses.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<ReachabilityStatus>> {
        self.statuses.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<Option<u32>>>) -> CostMatrix {
        CostMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_row_of_unreachables_is_isolated() {
        let m = matrix(vec![
            vec![Some(0), None, None],
            vec![Some(3), Some(0), Some(4)],
            vec![Some(2), Some(4), Some(0)],
        ]);
        assert_eq!(classify(0, &m), ReachabilityStatus::Isolated);
        assert_eq!(classify(1, &m), ReachabilityStatus::Connected);
    }

    #[test]
    fn test_zero_cost_edge_counts_as_reachable() {
        let m = matrix(vec![vec![Some(0), Some(0)], vec![Some(0), Some(0)]]);
        assert_eq!(classify(0, &m), ReachabilityStatus::Connected);
    }

    #[test]
    fn test_single_location_is_vacuously_isolated() {
        let m = CostMatrix::unreachable(1);
        assert_eq!(classify(0, &m), ReachabilityStatus::Isolated);
    }

    #[test]
    fn test_cache_memoizes_isolation() {
        let m = CostMatrix::unreachable(3);
        let cache = ReachabilityCache::new(3);
        assert_eq!(cache.status(1), ReachabilityStatus::Unknown);
        assert_eq!(cache.classify(1, &m), ReachabilityStatus::Isolated);
        assert!(cache.is_isolated(1));
        assert_eq!(cache.isolated(), vec![1]);
    }

    #[test]
    fn test_exhaustion_overrides_connected() {
        let m = matrix(vec![vec![Some(0), Some(1)], vec![Some(1), Some(0)]]);
        let cache = ReachabilityCache::new(2);
        assert_eq!(cache.classify(1, &m), ReachabilityStatus::Connected);

        cache.mark_exhausted([1]);
        // Cached isolation wins over a fresh row scan.
        assert_eq!(cache.classify(1, &m), ReachabilityStatus::Isolated);
    }
}
