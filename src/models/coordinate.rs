//! Coordinate model for raw vehicle positions

use serde::{Deserialize, Serialize};

/// Decimal places used for geocoding cache keys (about 111 m of latitude).
pub const CACHE_KEY_PRECISION: u32 = 3;

/// A WGS84 position
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build from a GeoJSON-ordered `[lon, lat]` pair
    #[must_use]
    pub const fn from_lon_lat(longitude: f64, latitude: f64) -> Self {
        Self::new(latitude, longitude)
    }

    /// Telemetry reports a missing fix as zero, so a zero (or non-finite)
    /// component means there is no position to enrich.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        !self.latitude.is_finite()
            || !self.longitude.is_finite()
            || self.latitude == 0.0
            || self.longitude == 0.0
    }

    /// Round coordinates for cache key generation
    #[must_use]
    pub fn rounded_coordinates(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.latitude * multiplier).round() / multiplier;
        let lon = (self.longitude * multiplier).round() / multiplier;
        (lat, lon)
    }

    /// Key of the geocoding cache cell containing this position
    #[must_use]
    pub fn cache_key(&self) -> String {
        let (lat, lon) = self.rounded_coordinates(CACHE_KEY_PRECISION);
        format!("{lat:.3},{lon:.3}")
    }
}
