//! Wires every enrichment component around one shared health tracker.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cache::{CacheStorage, FjallStorage, MemoryStorage};
use crate::config::FleetViewConfig;
use crate::elevation::ElevationProfiler;
use crate::geocoding::GeocodeCache;
use crate::health::ApiHealth;
use crate::labels::{BuiltinLabels, LabelResolver, Locale};
use crate::pois::PoiLocator;
use crate::providers::{
    NominatimGeocoder, OpenElevationSource, OpenMeteoSource, OsrmSource, OverpassSource,
};
use crate::rate_limit::RequestSpacing;
use crate::routing::RoutePlanner;
use crate::weather::WeatherService;

/// Everything the HTTP surface needs, cheap to clone
#[derive(Clone)]
pub struct EnrichmentServices {
    pub health: Arc<ApiHealth>,
    pub geocoding: Arc<GeocodeCache>,
    pub elevation: Arc<ElevationProfiler>,
    pub pois: Arc<PoiLocator>,
    pub routing: Arc<RoutePlanner>,
    pub weather: Arc<WeatherService>,
    pub locale: Locale,
    pub poi_radius_m: u32,
    pub elevation_max_samples: usize,
}

impl EnrichmentServices {
    /// Build the production graph: HTTP adapters, durable cache and shared limiter.
    pub fn from_config(config: &FleetViewConfig) -> Result<Self> {
        let user_agent = config.defaults.user_agent.as_str();
        let health = Arc::new(ApiHealth::new());
        let labels: Arc<dyn LabelResolver> = Arc::new(BuiltinLabels);
        let locale = config.defaults.locale();

        let storage: Arc<dyn CacheStorage> = if config.cache.persist {
            let location = config.cache.resolved_location();
            std::fs::create_dir_all(&location).with_context(|| {
                format!("Failed to create cache directory: {}", location.display())
            })?;
            Arc::new(
                FjallStorage::open(&location)
                    .with_context(|| format!("Failed to open cache at {}", location.display()))?,
            )
        } else {
            Arc::new(MemoryStorage::new())
        };

        let geocoder = NominatimGeocoder::new(&config.geocoding, user_agent)
            .context("Failed to build geocoding client")?;
        let geocoding = GeocodeCache::new(Arc::new(geocoder), storage, health.clone())
            .with_locale(locale)
            .with_labels(labels.clone())
            .with_spacing(RequestSpacing::new(config.defaults.geocoding_spacing()))
            .with_ttl(config.cache.ttl());

        let elevation_source = OpenElevationSource::new(&config.elevation, user_agent)
            .context("Failed to build elevation client")?;
        let poi_source = OverpassSource::new(&config.overpass, user_agent)
            .context("Failed to build Overpass client")?;
        let route_source = OsrmSource::new(&config.routing, user_agent)
            .context("Failed to build routing client")?;
        let weather_source = OpenMeteoSource::new(&config.weather, user_agent)
            .context("Failed to build weather client")?;

        Ok(Self {
            geocoding: Arc::new(geocoding),
            elevation: Arc::new(ElevationProfiler::new(Arc::new(elevation_source), health.clone())),
            pois: Arc::new(
                PoiLocator::new(Arc::new(poi_source), health.clone())
                    .with_locale(locale)
                    .with_labels(labels.clone()),
            ),
            routing: Arc::new(RoutePlanner::new(Arc::new(route_source), health.clone())),
            weather: Arc::new(
                WeatherService::new(Arc::new(weather_source), health.clone())
                    .with_locale(locale)
                    .with_labels(labels),
            ),
            health,
            locale,
            poi_radius_m: config.defaults.poi_radius_m,
            elevation_max_samples: config.defaults.elevation_max_samples as usize,
        })
    }
}
