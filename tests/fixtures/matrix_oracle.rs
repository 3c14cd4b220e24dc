//! Matrix-backed oracle and hand-checked scenario matrices.
//!
//! Location `i` sits at `(0.0, i * GRID_STEP)` and anchors to node `i`, so
//! every request can be mapped back to matrix indices.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use trip_planner::error::OracleError;
use trip_planner::matrix::CostMatrix;
use trip_planner::polyline::Polyline;
use trip_planner::route::PathResult;
use trip_planner::traits::{
    Anchor, Anchoring, CostMatrixProvider, GraphVersion, PathOptions, PathProvider,
};

pub const GRID_STEP: f64 = 0.01;
pub const CHECKSUM: u32 = 7;

/// Routes each leg at its matrix cost; missing entries have no path.
pub struct MatrixOracle {
    matrix: CostMatrix,
    /// Directed legs that fail to route even though the matrix has a cost.
    blocked: Vec<(usize, usize)>,
    /// Time each path request takes before answering.
    leg_delay: Option<Duration>,
    pub path_requests: Mutex<Vec<(usize, usize)>>,
    pub matrix_requests: AtomicUsize,
    pub anchor_lookups: AtomicUsize,
}

impl MatrixOracle {
    pub fn new(matrix: CostMatrix) -> Self {
        Self {
            matrix,
            blocked: Vec::new(),
            leg_delay: None,
            path_requests: Mutex::new(Vec::new()),
            matrix_requests: AtomicUsize::new(0),
            anchor_lookups: AtomicUsize::new(0),
        }
    }

    pub fn block(mut self, from: usize, to: usize) -> Self {
        self.blocked.push((from, to));
        self
    }

    pub fn with_leg_delay(mut self, delay: Duration) -> Self {
        self.leg_delay = Some(delay);
        self
    }

    pub fn matrix(&self) -> &CostMatrix {
        &self.matrix
    }

    pub fn coordinates(&self) -> Vec<(f64, f64)> {
        (0..self.matrix.size()).map(location).collect()
    }

    pub fn anchors(&self) -> Vec<Anchor> {
        self.coordinates()
            .into_iter()
            .enumerate()
            .map(|(node, location)| Anchor {
                location,
                node: node as u64,
                handle: None,
            })
            .collect()
    }

    pub fn path_request_count(&self) -> usize {
        self.path_requests.lock().unwrap().len()
    }

    pub fn reset_counters(&self) {
        self.path_requests.lock().unwrap().clear();
        self.matrix_requests.store(0, Ordering::SeqCst);
        self.anchor_lookups.store(0, Ordering::SeqCst);
    }
}

pub fn location(index: usize) -> (f64, f64) {
    (0.0, index as f64 * GRID_STEP)
}

impl CostMatrixProvider for MatrixOracle {
    fn cost_matrix(&self, _anchors: &[Anchor]) -> Result<CostMatrix, OracleError> {
        self.matrix_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.matrix.clone())
    }
}

impl PathProvider for MatrixOracle {
    fn shortest_path(
        &self,
        waypoints: &[Anchor],
        _options: &PathOptions,
    ) -> Result<PathResult, OracleError> {
        let (from, to) = (waypoints[0].node as usize, waypoints[1].node as usize);
        self.path_requests.lock().unwrap().push((from, to));
        if let Some(delay) = self.leg_delay {
            std::thread::sleep(delay);
        }

        if self.blocked.contains(&(from, to)) {
            return Err(OracleError::NoPath);
        }
        let cost = self.matrix.get(from, to).ok_or(OracleError::NoPath)?;
        Ok(PathResult {
            cost: u64::from(cost),
            distance: f64::from(cost) * 100.0,
            duration: f64::from(cost) / 10.0,
            geometry: Polyline::new(vec![waypoints[0].location, waypoints[1].location]),
        })
    }
}

impl Anchoring for MatrixOracle {
    fn graph_version(&self) -> GraphVersion {
        GraphVersion {
            checksum: CHECKSUM,
            node_count: self.matrix.size() as u64,
        }
    }

    fn anchor(&self, coordinate: (f64, f64)) -> Result<Anchor, OracleError> {
        self.anchor_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(Anchor {
            location: coordinate,
            node: (coordinate.1 / GRID_STEP).round() as u64,
            handle: None,
        })
    }
}

// ============================================================================
// Scenario matrices
// ============================================================================

fn rows(rows: Vec<Vec<Option<u32>>>) -> CostMatrix {
    CostMatrix::from_rows(rows).unwrap()
}

/// Symmetric 4x4. Nearest-neighbour circuits cost 18, 18, 18 and 21 from
/// starts 0..3; the best tour is [0, 1, 3, 2].
pub fn symmetric_four() -> CostMatrix {
    rows(vec![
        vec![Some(0), Some(2), Some(9), Some(10)],
        vec![Some(2), Some(0), Some(6), Some(4)],
        vec![Some(9), Some(6), Some(0), Some(3)],
        vec![Some(10), Some(4), Some(3), Some(0)],
    ])
}

/// Symmetric 4x4 where start 0 is dearer than start 1. Nearest-neighbour
/// circuits cost 21 ([0, 3, 2, 1]) and 18 ([1, 2, 0, 3]) from starts 0 and 1.
pub fn cheaper_second_start() -> CostMatrix {
    rows(vec![
        vec![Some(0), Some(10), Some(4), Some(3)],
        vec![Some(10), Some(0), Some(2), Some(9)],
        vec![Some(4), Some(2), Some(0), Some(6)],
        vec![Some(3), Some(9), Some(6), Some(0)],
    ])
}

/// Five locations where location 3 can neither reach nor be reached.
pub fn with_isolated_location() -> CostMatrix {
    let mut matrix = CostMatrix::unreachable(5);
    let connected = [0usize, 1, 2, 4];
    for &from in &connected {
        for &to in &connected {
            if from != to {
                matrix.set(from, to, Some(from.abs_diff(to) as u32 * 5));
            }
        }
    }
    matrix
}

/// No location reaches any other.
pub fn all_unreachable(size: usize) -> CostMatrix {
    CostMatrix::unreachable(size)
}
