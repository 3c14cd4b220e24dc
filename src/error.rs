//! Error taxonomy for trip planning.

use thiserror::Error;

/// Failures reported by an oracle collaborator (matrix, path or anchoring).
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("no path between the requested waypoints")]
    NoPath,
    #[error("invalid anchor at index {index}: {reason}")]
    InvalidAnchor { index: usize, reason: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("oracle responded with {code}: {message}")]
    Status { code: String, message: String },
    #[error("malformed oracle response: {0}")]
    Malformed(String),
}

impl OracleError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

/// Stage of the query pipeline a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    Anchoring,
    Matrix,
    Construction,
    Assembly,
    Selection,
}

#[derive(Debug, Error)]
pub enum TripError {
    #[error("invalid input{}: {reason}", .index.map(|i| format!(" at location {i}")).unwrap_or_default())]
    InvalidInput { index: Option<usize>, reason: String },
    #[error("location {start} is isolated and cannot start a tour")]
    NoViableStart { start: usize },
    #[error("no route found over {locations} locations ({failed} candidates failed, isolated: {isolated:?})")]
    NoRouteFound {
        locations: usize,
        isolated: Vec<usize>,
        failed: usize,
    },
    #[error("no path from location {from} to location {to}")]
    UnreachableLeg { from: usize, to: usize },
    #[error("timed out after {elapsed_ms}ms with {starts_tried} starts tried")]
    Timeout { elapsed_ms: u64, starts_tried: usize },
    #[error("oracle failure during {stage:?}: {source}")]
    Oracle {
        stage: Stage,
        #[source]
        source: OracleError,
    },
}

pub type Result<T> = std::result::Result<T, TripError>;

impl TripError {
    pub fn invalid_input(index: Option<usize>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            index,
            reason: reason.into(),
        }
    }

    pub fn oracle(stage: Stage, source: OracleError) -> Self {
        Self::Oracle { stage, source }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidInput { .. } => Stage::Input,
            Self::NoViableStart { .. } => Stage::Construction,
            Self::NoRouteFound { .. } | Self::Timeout { .. } => Stage::Selection,
            Self::UnreachableLeg { .. } => Stage::Assembly,
            Self::Oracle { stage, .. } => *stage,
        }
    }

    /// Index of the location the failure concerns, if any.
    pub fn location(&self) -> Option<usize> {
        match self {
            Self::InvalidInput { index, .. } => *index,
            Self::NoViableStart { start } => Some(*start),
            Self::UnreachableLeg { from, .. } => Some(*from),
            Self::Oracle {
                source: OracleError::InvalidAnchor { index, .. },
                ..
            } => Some(*index),
            _ => None,
        }
    }

    /// HTTP-style status code for the query boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput { .. } => 400,
            Self::Oracle {
                source: OracleError::InvalidAnchor { .. },
                ..
            } => 400,
            Self::NoViableStart { .. } | Self::NoRouteFound { .. } | Self::UnreachableLeg { .. } => 404,
            Self::Oracle { .. } => 502,
            Self::Timeout { .. } => 504,
        }
    }
}
