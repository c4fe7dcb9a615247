//! Data models for the FleetView enrichment crate
//!
//! This module contains the core domain models organized by concern:
//! - Coordinate: raw vehicle positions and cache keys
//! - Address: reverse-geocoded, human-readable locations
//! - Elevation: sampled profiles and their statistics
//! - Poi: points of interest around a position
//! - Route: routed trips and efficiency comparisons
//! - Weather: current conditions at a position

pub mod address;
pub mod coordinate;
pub mod elevation;
pub mod poi;
pub mod route;
pub mod weather;

// Re-export all public types for convenient access
pub use address::Address;
pub use coordinate::Coordinate;
pub use elevation::{ElevationSample, ElevationStats};
pub use poi::{FuelOptions, Poi, PoiCategory};
pub use route::{Route, RouteComparison, RouteRating};
pub use weather::CurrentWeather;
