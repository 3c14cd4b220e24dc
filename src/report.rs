//! Result reporting: the assembled route plus auxiliary trip output.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::route::RouteResult;
use crate::selector::SelectionStats;
use crate::traits::ResultSink;

/// Everything a renderer needs for one answered trip query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripReport {
    pub route: RouteResult,
    /// Visiting position of each input location; `None` when excluded.
    pub loc_permutation: Vec<Option<usize>>,
    /// Total routed cost of the circuit.
    pub distance: u64,
    pub runtime_ms: u64,
    pub strategy: Option<String>,
    /// Hint tokens the caller can send back to skip re-anchoring.
    pub hints: Vec<String>,
    /// Selection bookkeeping; absent when the caller supplied the order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<SelectionStats>,
}

/// Writes each report as one line of JSON.
///
/// Emission is fire-and-forget: write failures are logged, not returned.
#[derive(Debug)]
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for JsonSink<W> {
    fn emit(&mut self, report: &TripReport) {
        let written = serde_json::to_writer(&mut self.writer, report)
            .map_err(std::io::Error::from)
            .and_then(|_| self.writer.write_all(b"\n"))
            .and_then(|_| self.writer.flush());

        if let Err(err) = written {
            tracing::warn!(error = %err, "failed to write trip report");
        }
    }
}
