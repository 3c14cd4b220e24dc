//! Haversine oracle (fallback when no routing backend is available).
//!
//! Uses great-circle distance to estimate travel time and straight lines as
//! leg geometry. Less accurate than a road graph but always available.

use crate::error::OracleError;
use crate::matrix::CostMatrix;
use crate::polyline::Polyline;
use crate::route::PathResult;
use crate::traits::{Anchor, Anchoring, CostMatrixProvider, GraphVersion, PathOptions, PathProvider};

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Quantization used to derive stable node handles from coordinates.
const NODE_GRID: f64 = 1e5;

#[derive(Debug, Clone)]
pub struct HaversineOracle {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
    /// Pairs farther apart than this are treated as unreachable.
    pub max_reach_km: Option<f64>,
}

impl Default for HaversineOracle {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
            max_reach_km: None,
        }
    }
}

impl HaversineOracle {
    pub fn new(speed_kmh: f64) -> Self {
        Self {
            speed_kmh,
            max_reach_km: None,
        }
    }

    pub fn with_max_reach_km(mut self, km: f64) -> Self {
        self.max_reach_km = Some(km);
        self
    }

    /// Calculate haversine distance between two points in kilometers.
    fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
        let (lat1, lng1) = from;
        let (lat2, lng2) = to;

        let lat1_rad = lat1.to_radians();
        let lat2_rad = lat2.to_radians();
        let delta_lat = (lat2 - lat1).to_radians();
        let delta_lng = (lng2 - lng1).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }

    /// Travel time in seconds for `km` at the assumed speed.
    fn km_to_seconds(&self, km: f64) -> f64 {
        km / self.speed_kmh * 3600.0
    }

    /// Cost in deciseconds, matching the routed-oracle cost unit.
    fn cost(&self, from: (f64, f64), to: (f64, f64)) -> Option<u32> {
        let km = Self::haversine_km(from, to);
        if self.max_reach_km.is_some_and(|max| km > max) {
            return None;
        }
        Some((self.km_to_seconds(km) * 10.0).round() as u32)
    }
}

impl CostMatrixProvider for HaversineOracle {
    fn cost_matrix(&self, anchors: &[Anchor]) -> Result<CostMatrix, OracleError> {
        let n = anchors.len();
        let mut matrix = CostMatrix::unreachable(n);

        for (i, from) in anchors.iter().enumerate() {
            for (j, to) in anchors.iter().enumerate() {
                if i != j {
                    matrix.set(i, j, self.cost(from.location, to.location));
                }
            }
        }

        Ok(matrix)
    }
}

impl PathProvider for HaversineOracle {
    fn shortest_path(
        &self,
        waypoints: &[Anchor],
        _options: &PathOptions,
    ) -> Result<PathResult, OracleError> {
        if waypoints.len() < 2 {
            return Err(OracleError::malformed("path request needs at least two waypoints"));
        }

        let mut result = PathResult {
            geometry: Polyline::new(vec![waypoints[0].location]),
            ..PathResult::default()
        };
        for pair in waypoints.windows(2) {
            let (from, to) = (pair[0].location, pair[1].location);
            let cost = self.cost(from, to).ok_or(OracleError::NoPath)?;
            let km = Self::haversine_km(from, to);
            result.cost += u64::from(cost);
            result.distance += km * 1000.0;
            result.duration += self.km_to_seconds(km);
            result.geometry.extend(&Polyline::new(vec![from, to]));
        }
        Ok(result)
    }
}

impl Anchoring for HaversineOracle {
    fn graph_version(&self) -> GraphVersion {
        GraphVersion {
            checksum: 0,
            node_count: u64::MAX,
        }
    }

    fn anchor(&self, coordinate: (f64, f64)) -> Result<Anchor, OracleError> {
        let (lat, lng) = coordinate;
        let row = ((lat + 90.0) * NODE_GRID).round() as u64;
        let col = ((lng + 180.0) * NODE_GRID).round() as u64;
        Ok(Anchor {
            location: coordinate,
            node: row * (360.0 * NODE_GRID) as u64 + col,
            handle: None,
        })
    }
}
