//! Test fixtures for trip-planner.
//!
//! Provides:
//! - Real Las Vegas / Henderson stops (from OpenStreetMap)
//! - A matrix-backed oracle with hand-checked scenario matrices

#![allow(dead_code)]

pub mod las_vegas;
pub mod matrix_oracle;

pub use las_vegas::*;
pub use matrix_oracle::*;
