//! In-process fakes of the upstream contracts.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::cache::MemoryStorage;
use crate::elevation::{ElevationPoint, ElevationProfiler, ElevationSource};
use crate::error::UpstreamError;
use crate::geocoding::{GeocodeCache, RawAddress, ReverseGeocodeResponse, ReverseGeocoder};
use crate::health::ApiHealth;
use crate::labels::Locale;
use crate::models::Coordinate;
use crate::pois::{OverpassResponse, PoiLocator, PoiSource};
use crate::rate_limit::RequestSpacing;
use crate::routing::{RawGeometry, RawRoute, RoutePlanner, RouteResponse, RouteSource};
use crate::services::EnrichmentServices;
use crate::weather::{CurrentWeatherData, ForecastResponse, WeatherService, WeatherSource};

fn unavailable() -> UpstreamError {
    UpstreamError::Status {
        status: 503,
        message: "service unavailable".to_string(),
    }
}

#[derive(Default)]
pub struct FakeGeocoder {
    calls: Mutex<Vec<(Coordinate, Locale, Instant)>>,
    failing: AtomicBool,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let fake = Self::default();
        fake.set_failing(true);
        fake
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, _, at)| *at).collect()
    }
}

#[async_trait]
impl ReverseGeocoder for FakeGeocoder {
    async fn reverse(
        &self,
        coordinate: Coordinate,
        locale: Locale,
    ) -> Result<ReverseGeocodeResponse, UpstreamError> {
        self.calls
            .lock()
            .unwrap()
            .push((coordinate, locale, Instant::now()));
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(ReverseGeocodeResponse {
            display_name: Some(format!(
                "Test street near {:.4}, {:.4}",
                coordinate.latitude, coordinate.longitude
            )),
            address: Some(RawAddress {
                road: Some("Václavské náměstí".to_string()),
                house_number: Some("1".to_string()),
                city: Some("Praha".to_string()),
                postcode: Some("110 00".to_string()),
                country: Some("Česko".to_string()),
                ..RawAddress::default()
            }),
        })
    }
}

#[derive(Default)]
pub struct FakeElevation {
    batch_calls: AtomicUsize,
    failing: bool,
}

impl FakeElevation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// Terrain rising 10 m per 0.001° of latitude
    fn terrain(point: Coordinate) -> f64 {
        200.0 + (point.latitude - 49.0) * 10_000.0
    }
}

#[async_trait]
impl ElevationSource for FakeElevation {
    async fn lookup(&self, points: &[Coordinate]) -> Result<Vec<ElevationPoint>, UpstreamError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(UpstreamError::Timeout("15s elapsed".to_string()));
        }
        Ok(points
            .iter()
            .map(|point| ElevationPoint {
                latitude: Some(point.latitude),
                longitude: Some(point.longitude),
                elevation: Some(Self::terrain(*point)),
            })
            .collect())
    }

    async fn lookup_one(&self, point: Coordinate) -> Result<Option<f64>, UpstreamError> {
        if self.failing {
            return Err(UpstreamError::Timeout("15s elapsed".to_string()));
        }
        Ok(Some(Self::terrain(point)))
    }
}

pub struct FakePois {
    response: Option<OverpassResponse>,
    queries: Mutex<Vec<String>>,
}

impl FakePois {
    pub fn with_response(response: OverpassResponse) -> Self {
        Self {
            response: Some(response),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl PoiSource for FakePois {
    async fn query(&self, query: &str) -> Result<OverpassResponse, UpstreamError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.response.clone().ok_or_else(unavailable)
    }
}

pub struct FakeRoutes {
    response: Option<RouteResponse>,
    calls: Mutex<Vec<Vec<Coordinate>>>,
}

impl FakeRoutes {
    pub fn with_route(distance: f64, duration: f64, coordinates: Vec<Vec<f64>>) -> Self {
        Self {
            response: Some(RouteResponse {
                routes: vec![RawRoute {
                    distance,
                    duration,
                    geometry: RawGeometry { coordinates },
                }],
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self {
            response: Some(RouteResponse::default()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<Coordinate>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RouteSource for FakeRoutes {
    async fn route(&self, waypoints: &[Coordinate]) -> Result<RouteResponse, UpstreamError> {
        self.calls.lock().unwrap().push(waypoints.to_vec());
        self.response
            .clone()
            .ok_or_else(|| UpstreamError::Timeout("30s elapsed".to_string()))
    }
}

#[derive(Default)]
pub struct FakeWeather {
    calls: Mutex<Vec<Vec<Coordinate>>>,
    failing: bool,
}

impl FakeWeather {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Vec<Coordinate>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherSource for FakeWeather {
    async fn current(&self, points: &[Coordinate]) -> Result<Vec<ForecastResponse>, UpstreamError> {
        self.calls.lock().unwrap().push(points.to_vec());
        if self.failing {
            return Err(UpstreamError::Transport("connection refused".to_string()));
        }
        Ok(points
            .iter()
            .map(|_| ForecastResponse {
                current_weather: Some(CurrentWeatherData {
                    temperature: 12.6,
                    windspeed: 8.2,
                    weathercode: Some(2),
                    is_day: 1,
                }),
            })
            .collect())
    }
}

/// Services graph over the fakes above with a 1 ms geocoding spacing
pub fn fake_services() -> EnrichmentServices {
    let health = Arc::new(ApiHealth::new());
    let geocoding = GeocodeCache::new(
        Arc::new(FakeGeocoder::new()),
        Arc::new(MemoryStorage::new()),
        health.clone(),
    )
    .with_spacing(RequestSpacing::new(Duration::from_millis(1)));

    EnrichmentServices {
        geocoding: Arc::new(geocoding),
        elevation: Arc::new(ElevationProfiler::new(Arc::new(FakeElevation::new()), health.clone())),
        pois: Arc::new(PoiLocator::new(
            Arc::new(FakePois::with_response(OverpassResponse::default())),
            health.clone(),
        )),
        routing: Arc::new(RoutePlanner::new(Arc::new(FakeRoutes::empty()), health.clone())),
        weather: Arc::new(WeatherService::new(Arc::new(FakeWeather::new()), health.clone())),
        health,
        locale: Locale::Cs,
        poi_radius_m: 2000,
        elevation_max_samples: 100,
    }
}
