//! Per-query planner options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TripError};
use crate::strategy::StrategyKind;
use crate::traits::PathOptions;

/// How candidates are costed while searching for the best start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyMode {
    /// Route every candidate through the oracle and compare routed costs.
    #[default]
    Eager,
    /// Rank candidates by matrix cost and route only the winner, falling
    /// back to the runner-up when a leg turns out to have no path.
    Deferred,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripOptions {
    pub strategy: StrategyKind,
    /// Stop trying new starts after this many milliseconds.
    pub timeout_ms: Option<u64>,
    /// Run start trials on the rayon pool. Trials share reachability state,
    /// so on partially reachable matrices the chosen start can vary between
    /// runs.
    pub parallel: bool,
    /// Request the legs of one tour concurrently.
    pub concurrent_legs: bool,
    pub assembly: AssemblyMode,
    pub allow_uturns: bool,
}

impl Default for TripOptions {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::NearestNeighbor,
            timeout_ms: None,
            parallel: false,
            concurrent_legs: false,
            assembly: AssemblyMode::Eager,
            allow_uturns: false,
        }
    }
}

impl TripOptions {
    /// Parses options from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| TripError::invalid_input(None, format!("invalid trip options: {}", err)))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn path_options(&self) -> PathOptions {
        PathOptions {
            allow_uturns: self.allow_uturns,
        }
    }
}
