//! Polyline representation for route geometries.
//!
//! This module provides a type for working with polylines as decoded
//! coordinate sequences, plus the encoded wire format used by the directions
//! service: signed values zig-zag encoded into 5-bit groups with a 0x20
//! continuation bit, offset by 63 into printable ASCII, each point stored as
//! a delta from the previous one and scaled by 1e-5.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A polyline representing a route geometry as decoded coordinates.
///
/// Stores latitude/longitude points directly for internal processing.
/// The compact encoded form only appears at API boundaries.
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

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }
}

/// The encoded string was truncated or contained a byte outside the format's
/// printable range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    offset: usize,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid polyline encoding at byte {}", self.offset)
    }
}

impl std::error::Error for DecodeError {}

/// Decodes an encoded polyline string into coordinate points.
pub fn decode(encoded: &str) -> Result<Polyline, DecodeError> {
    let bytes = encoded.as_bytes();
    let mut idx = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut points = Vec::new();
    while idx < bytes.len() {
        lat += decode_value(bytes, &mut idx)?;
        lng += decode_value(bytes, &mut idx)?;
        points.push((lat as f64 / 1e5, lng as f64 / 1e5));
    }
    Ok(Polyline::new(points))
}

fn decode_value(bytes: &[u8], idx: &mut usize) -> Result<i64, DecodeError> {
    let mut value: i64 = 0;
    let mut shift = 0;
    loop {
        let byte = *bytes.get(*idx).ok_or(DecodeError { offset: *idx })?;
        if byte < 63 {
            return Err(DecodeError { offset: *idx });
        }
        let chunk = i64::from(byte) - 63;
        *idx += 1;
        value |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }
    // Lowest bit carries the sign.
    Ok(if value & 1 != 0 { !(value >> 1) } else { value >> 1 })
}

/// Encodes coordinate points into the compact polyline string.
pub fn encode(points: &[(f64, f64)]) -> String {
    let mut out = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;
    for &(lat, lng) in points {
        let lat_e5 = (lat * 1e5).round() as i64;
        let lng_e5 = (lng * 1e5).round() as i64;
        encode_value(lat_e5 - prev_lat, &mut out);
        encode_value(lng_e5 - prev_lng, &mut out);
        prev_lat = lat_e5;
        prev_lng = lng_e5;
    }
    out
}

fn encode_value(value: i64, out: &mut String) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };
    while v >= 0x20 {
        out.push((((v & 0x1f) | 0x20) as u8 + 63) as char);
        v >>= 5;
    }
    out.push((v as u8 + 63) as char);
}
