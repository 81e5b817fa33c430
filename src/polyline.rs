//! Polyline representation for route geometries.
//!
//! Routes are kept as decoded coordinate sequences. The compact encoded
//! polyline format (precision 1e5) is only produced at the boundary, when the
//! host app hands a path to its map view.

use serde::{Deserialize, Serialize};

use crate::models::Coordinates;

const PRECISION: f64 = 1e5;

/// A polyline as decoded (latitude, longitude) points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    ///
    /// Each point is a (latitude, longitude) tuple.
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    pub fn from_coordinates(coordinates: impl IntoIterator<Item = Coordinates>) -> Self {
        Self::new(
            coordinates
                .into_iter()
                .map(|c| (c.latitude, c.longitude))
                .collect(),
        )
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }

    /// Encode as a Google encoded polyline string.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        let (mut prev_lat, mut prev_lng) = (0i64, 0i64);
        for &(lat, lng) in &self.points {
            let lat = (lat * PRECISION).round() as i64;
            let lng = (lng * PRECISION).round() as i64;
            encode_value(lat - prev_lat, &mut out);
            encode_value(lng - prev_lng, &mut out);
            prev_lat = lat;
            prev_lng = lng;
        }
        out
    }

    /// Decode a Google encoded polyline string.
    ///
    /// Returns `None` on truncated or out-of-range input.
    pub fn decode(encoded: &str) -> Option<Self> {
        let mut bytes = encoded.bytes();
        let mut points = Vec::new();
        let (mut lat, mut lng) = (0i64, 0i64);
        loop {
            let Some(dlat) = decode_value(&mut bytes) else {
                break;
            };
            let dlng = decode_value(&mut bytes)?;
            lat += dlat?;
            lng += dlng?;
            points.push((lat as f64 / PRECISION, lng as f64 / PRECISION));
        }
        Some(Self::new(points))
    }
}

fn encode_value(value: i64, out: &mut String) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };
    while v >= 0x20 {
        out.push((((v & 0x1f) | 0x20) as u8 + 63) as char);
        v >>= 5;
    }
    out.push((v as u8 + 63) as char);
}

/// `None` at end of input, `Some(None)` for a malformed chunk.
fn decode_value(bytes: &mut impl Iterator<Item = u8>) -> Option<Option<i64>> {
    let mut result = 0i64;
    let mut shift = 0;
    let mut first = true;
    loop {
        let Some(byte) = bytes.next() else {
            return if first { None } else { Some(None) };
        };
        first = false;
        if !(63..=126).contains(&byte) || shift > 60 {
            return Some(None);
        }
        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }
    let value = if result & 1 == 1 { !(result >> 1) } else { result >> 1 };
    Some(Some(value))
}
