//! Collaborator interfaces for the trip planner.
//!
//! The planner never searches the road graph itself. Shortest paths, cost
//! matrices and coordinate snapping come from an oracle implementing these
//! traits; instruction text and serialization are pluggable as well.

use serde::{Deserialize, Serialize};

use crate::error::OracleError;
use crate::matrix::CostMatrix;
use crate::report::TripReport;
use crate::route::{Instruction, PathResult, RouteResult};

/// A coordinate snapped onto the routing graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Snapped position (lat, lng).
    pub location: (f64, f64),
    /// Graph handle the position was snapped to.
    pub node: u64,
    /// Provider-specific token that lets the oracle skip re-snapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
}

impl Anchor {
    /// Whether the anchor can belong to a graph with `node_count` nodes.
    pub fn is_valid(&self, node_count: u64) -> bool {
        let (lat, lng) = self.location;
        self.node < node_count && lat.is_finite() && lng.is_finite()
    }
}

/// One input waypoint: what the caller sent and where it landed on the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub coordinate: (f64, f64),
    pub anchor: Anchor,
}

/// Identity of the graph anchors were resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphVersion {
    pub checksum: u32,
    pub node_count: u64,
}

/// Directionality hints for a path request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathOptions {
    /// Allow turning around at intermediate waypoints.
    pub allow_uturns: bool,
}

/// Provides the pairwise cost matrix for a set of anchors.
///
/// The matrix is indexed by the provided anchor order.
pub trait CostMatrixProvider {
    fn cost_matrix(&self, anchors: &[Anchor]) -> Result<CostMatrix, OracleError>;
}

/// Provides the shortest path visiting `waypoints` in order.
///
/// Returns [`OracleError::NoPath`] when some consecutive pair cannot be
/// connected.
pub trait PathProvider {
    fn shortest_path(
        &self,
        waypoints: &[Anchor],
        options: &PathOptions,
    ) -> Result<PathResult, OracleError>;
}

/// Snaps raw coordinates onto the routing graph.
pub trait Anchoring {
    fn graph_version(&self) -> GraphVersion;

    fn anchor(&self, coordinate: (f64, f64)) -> Result<Anchor, OracleError>;
}

/// Everything a trip query needs from the routing backend.
pub trait Oracle: CostMatrixProvider + PathProvider + Anchoring {}

impl<T> Oracle for T where T: CostMatrixProvider + PathProvider + Anchoring {}

/// Labels the legs of an assembled route with instructions.
///
/// Returns one instruction list per leg, in leg order.
pub trait InstructionAnnotator {
    fn annotate(&self, route: &RouteResult) -> Vec<Vec<Instruction>>;
}

/// Receives the final result of a query, e.g. to serialize it.
pub trait ResultSink {
    fn emit(&mut self, report: &TripReport);
}
