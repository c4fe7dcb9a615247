//! `FleetView` geospatial enrichment
//!
//! Turns raw vehicle positions into cached addresses, elevation profiles,
//! nearby points of interest, route-efficiency comparisons and current
//! weather, while tracking the health of every upstream service.

pub mod api;
pub mod cache;
pub mod config;
pub mod elevation;
pub mod enrichment;
pub mod error;
pub mod geo;
pub mod geocoding;
pub mod health;
pub mod labels;
pub mod models;
pub mod pois;
pub mod providers;
pub mod rate_limit;
pub mod routing;
pub mod services;
pub mod weather;
pub mod web;

#[cfg(test)]
mod test_support;

// Re-export core types for public API
pub use cache::{CacheStorage, FjallStorage, MemoryStorage};
pub use config::FleetViewConfig;
pub use elevation::{ElevationProfiler, ElevationSource, compute_stats};
pub use enrichment::Enrichment;
pub use error::{FleetGeoError, RoutingError, UpstreamError};
pub use geocoding::{GeocodeCache, ReverseGeocoder};
pub use health::{ApiHealth, ApiHealthStatus, ApiSource};
pub use labels::{BuiltinLabels, Label, LabelResolver, Locale};
pub use models::{
    Address, Coordinate, CurrentWeather, ElevationSample, ElevationStats, Poi, PoiCategory, Route,
    RouteComparison, RouteRating,
};
pub use pois::{PoiLocator, PoiSource};
pub use rate_limit::RequestSpacing;
pub use routing::{RoutePlanner, RouteSource};
pub use services::EnrichmentServices;
pub use weather::{WeatherService, WeatherSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, FleetGeoError>;
