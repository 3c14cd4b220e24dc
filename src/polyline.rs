//! Leg geometry as decoded coordinates.
//!
//! Geometry is kept as `(lat, lng)` points inside the planner. The compact
//! encoded-polyline format is only used at the oracle boundary, so the codec
//! lives here next to the type it produces.

use serde::{Deserialize, Serialize};

use crate::error::OracleError;

/// Precision of the standard encoded-polyline format (1e-5 degrees).
pub const PRECISION_5: u32 = 5;

/// Precision used by `polyline6` geometries (1e-6 degrees).
pub const PRECISION_6: u32 = 6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Appends `other`, dropping its first point when it repeats our last one.
    pub fn extend(&mut self, other: &Polyline) {
        let skip = match (self.points.last(), other.points.first()) {
            (Some(last), Some(first)) if last == first => 1,
            _ => 0,
        };
        self.points.extend(other.points.iter().skip(skip));
    }

    /// Decodes an encoded polyline string at the given precision.
    pub fn decode(encoded: &str, precision: u32) -> Result<Self, OracleError> {
        let factor = 10f64.powi(precision as i32);
        let bytes = encoded.as_bytes();
        let mut points = Vec::new();
        let mut index = 0;
        let (mut lat, mut lng) = (0i64, 0i64);

        while index < bytes.len() {
            lat += decode_value(bytes, &mut index)?;
            lng += decode_value(bytes, &mut index)?;
            points.push((lat as f64 / factor, lng as f64 / factor));
        }

        Ok(Self { points })
    }

    /// Encodes the points as a polyline string at the given precision.
    pub fn encode(&self, precision: u32) -> String {
        let factor = 10f64.powi(precision as i32);
        let mut output = String::new();
        let (mut prev_lat, mut prev_lng) = (0i64, 0i64);

        for &(lat, lng) in &self.points {
            let lat = (lat * factor).round() as i64;
            let lng = (lng * factor).round() as i64;
            encode_value(lat - prev_lat, &mut output);
            encode_value(lng - prev_lng, &mut output);
            prev_lat = lat;
            prev_lng = lng;
        }

        output
    }
}

fn decode_value(bytes: &[u8], index: &mut usize) -> Result<i64, OracleError> {
    let mut result = 0i64;
    let mut shift = 0;
    loop {
        let Some(&byte) = bytes.get(*index) else {
            return Err(OracleError::malformed("truncated polyline"));
        };
        *index += 1;
        if !(63..=126).contains(&byte) || shift > 60 {
            return Err(OracleError::malformed(format!("invalid polyline byte {}", byte)));
        }
        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }
    Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}

fn encode_value(value: i64, output: &mut String) {
    let mut value = if value < 0 { !(value << 1) } else { value << 1 };
    while value >= 0x20 {
        output.push(char::from((((value & 0x1f) | 0x20) + 63) as u8));
        value >>= 5;
    }
    output.push(char::from((value + 63) as u8));
}
