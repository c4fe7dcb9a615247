//! Elevation profile models

use serde::{Deserialize, Serialize};

/// One sampled point of an elevation profile
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElevationSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above sea level, `None` when the upstream had no data
    pub elevation: Option<f64>,
    pub index: usize,
    /// Meters along the sampled path, rounded
    pub distance_from_start: f64,
}

/// Aggregate statistics over a profile, in whole meters
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ElevationStats {
    pub min: i64,
    pub max: i64,
    pub start: i64,
    pub end: i64,
    pub total_ascent: i64,
    pub total_descent: i64,
    pub avg: i64,
}
