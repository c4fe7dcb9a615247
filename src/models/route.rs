//! Routing models

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// A routed trip between waypoints
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Meters
    pub distance: f64,
    /// Seconds
    pub duration: f64,
    /// Kilometers with one decimal, e.g. `"12.3"`
    pub distance_km: String,
    pub duration_min: i64,
    /// Path in (lat, lon) order
    pub geometry: Vec<Coordinate>,
}

/// Qualitative band of a route efficiency
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RouteRating {
    Excellent,
    Good,
    Fair,
    Poor,
    Unknown,
}

impl RouteRating {
    /// Bands are inclusive on their lower bound: 70 is fair, 85 good, 95 excellent.
    #[must_use]
    pub fn from_efficiency(efficiency: i64) -> Self {
        match efficiency {
            e if e < 70 => RouteRating::Poor,
            e if e < 85 => RouteRating::Fair,
            e if e < 95 => RouteRating::Good,
            _ => RouteRating::Excellent,
        }
    }
}

/// Actual vs. optimal trip distance
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RouteComparison {
    /// `optimal / actual` as a whole percentage
    pub efficiency: i64,
    /// Extra kilometers driven, formatted with one decimal
    pub difference: String,
    pub rating: RouteRating,
}

impl RouteComparison {
    /// Returned whenever either distance is missing or non-positive
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            efficiency: 100,
            difference: "0".to_string(),
            rating: RouteRating::Unknown,
        }
    }
}
