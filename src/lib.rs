//! trip-planner: round-trip route planning over a road-network oracle.
//!
//! Given N coordinates, builds a closed tour visiting them all (or every
//! location reachable from the chosen start), routes each leg through the
//! oracle and reports the cheapest circuit found across all start points.

pub mod annotate;
pub mod assembler;
pub mod config;
pub mod error;
pub mod farthest_insertion;
pub mod haversine;
pub mod hint;
pub mod matrix;
pub mod nearest_neighbor;
pub mod osrm;
pub mod polyline;
pub mod reachability;
pub mod report;
pub mod route;
pub mod selector;
pub mod strategy;
pub mod tour;
pub mod traits;
pub mod trip;

pub use config::{AssemblyMode, TripOptions};
pub use error::{OracleError, Result, TripError};
pub use matrix::CostMatrix;
pub use report::TripReport;
pub use strategy::StrategyKind;
pub use trip::{TripPlanner, TripQuery};
