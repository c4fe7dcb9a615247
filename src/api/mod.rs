use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    elevation::compute_stats,
    enrichment::Enrichment,
    error::{FleetGeoError, RoutingError},
    health::ApiHealthStatus,
    models::{
        Address, Coordinate, CurrentWeather, ElevationSample, ElevationStats, Poi, PoiCategory,
        Route, RouteComparison,
    },
    routing,
    services::EnrichmentServices,
};

/// Wire form of an [`Enrichment`]: `{"status": "ready", "data": ...}`
#[derive(Debug, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum EnrichmentBody<T> {
    Ready(T),
    Skipped,
    Unavailable(String),
}

impl<T> From<Enrichment<T>> for EnrichmentBody<T> {
    fn from(outcome: Enrichment<T>) -> Self {
        match outcome {
            Enrichment::Ready(value) => EnrichmentBody::Ready(value),
            Enrichment::Skipped => EnrichmentBody::Skipped,
            Enrichment::Unavailable(err) => EnrichmentBody::Unavailable(err.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error response with a JSON `{"error": ...}` body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<RoutingError> for ApiError {
    fn from(err: RoutingError) -> Self {
        let status = match err {
            RoutingError::TooFewWaypoints => StatusCode::BAD_REQUEST,
            RoutingError::NoRoute => StatusCode::NOT_FOUND,
            RoutingError::Upstream(ref upstream) if upstream.is_timeout() => {
                StatusCode::GATEWAY_TIMEOUT
            }
            RoutingError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        ApiError::new(status, err.to_string())
    }
}

impl From<FleetGeoError> for ApiError {
    fn from(err: FleetGeoError) -> Self {
        let status = match err {
            FleetGeoError::Validation { .. } => StatusCode::BAD_REQUEST,
            FleetGeoError::Config { .. } | FleetGeoError::Cache { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        ApiError::new(status, err.user_message())
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct PositionQuery {
    pub lat: f64,
    pub lon: f64,
}

impl PositionQuery {
    fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub points: Vec<Coordinate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub points: Vec<Coordinate>,
    pub max_samples: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ProfileBody {
    pub profile: Vec<ElevationSample>,
    pub stats: Option<ElevationStats>,
}

#[derive(Debug, Deserialize)]
pub struct PoiQuery {
    pub lat: f64,
    pub lon: f64,
    pub radius: Option<u32>,
    /// Comma-separated categories; all fleet categories when missing
    pub categories: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub actual: Option<f64>,
    pub optimal: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub actual_km: f64,
    pub waypoints: Vec<Coordinate>,
}

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub waypoints: Vec<Coordinate>,
}

pub fn router() -> Router<EnrichmentServices> {
    Router::new()
        .route("/health", get(get_health))
        .route("/geocode", get(get_address))
        .route("/geocode/cached", get(get_cached_address))
        .route("/geocode/batch", post(resolve_addresses))
        .route("/elevation", get(get_elevation))
        .route("/elevation/profile", post(build_profile))
        .route("/pois", get(get_pois))
        .route("/route/compare", get(compare_distances).post(compare_with_optimal))
        .route("/route/optimal", post(get_optimal_route))
        .route("/weather", get(get_weather))
}

async fn get_health(State(services): State<EnrichmentServices>) -> Json<Vec<ApiHealthStatus>> {
    Json(services.health.snapshot())
}

async fn get_address(
    State(services): State<EnrichmentServices>,
    Query(position): Query<PositionQuery>,
) -> Json<EnrichmentBody<Address>> {
    Json(services.geocoding.resolve(position.coordinate()).await.into())
}

async fn get_cached_address(
    State(services): State<EnrichmentServices>,
    Query(position): Query<PositionQuery>,
) -> Json<EnrichmentBody<Address>> {
    let cached = services.geocoding.peek(position.coordinate()).await;
    Json(cached.map_or(EnrichmentBody::Skipped, EnrichmentBody::Ready))
}

async fn resolve_addresses(
    State(services): State<EnrichmentServices>,
    Json(request): Json<BatchRequest>,
) -> Json<Vec<Option<Address>>> {
    Json(services.geocoding.resolve_batch(&request.points).await)
}

async fn get_elevation(
    State(services): State<EnrichmentServices>,
    Query(position): Query<PositionQuery>,
) -> Json<EnrichmentBody<f64>> {
    Json(services.elevation.elevation_at(position.coordinate()).await.into())
}

async fn build_profile(
    State(services): State<EnrichmentServices>,
    Json(request): Json<ProfileRequest>,
) -> ApiResult<EnrichmentBody<ProfileBody>> {
    let max_samples = request.max_samples.unwrap_or(services.elevation_max_samples);
    if max_samples < 2 {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "maxSamples must be at least 2"));
    }
    let outcome = services
        .elevation
        .build_profile(&request.points, max_samples)
        .await
        .map(|profile| ProfileBody {
            stats: compute_stats(&profile),
            profile,
        });
    Ok(Json(outcome.into()))
}

async fn get_pois(
    State(services): State<EnrichmentServices>,
    Query(query): Query<PoiQuery>,
) -> ApiResult<EnrichmentBody<Vec<Poi>>> {
    let categories = match query.categories.as_deref() {
        Some(raw) if !raw.trim().is_empty() => raw
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse::<PoiCategory>)
            .collect::<Result<Vec<_>, _>>()?,
        _ => PoiCategory::ALL.to_vec(),
    };
    let radius = query.radius.unwrap_or(services.poi_radius_m);
    let origin = Coordinate::new(query.lat, query.lon);
    Ok(Json(services.pois.find_nearby(origin, radius, &categories).await.into()))
}

async fn compare_distances(Query(query): Query<CompareQuery>) -> Json<RouteComparison> {
    Json(routing::compare(
        query.actual.unwrap_or(f64::NAN),
        query.optimal.unwrap_or(f64::NAN),
    ))
}

async fn compare_with_optimal(
    State(services): State<EnrichmentServices>,
    Json(request): Json<CompareRequest>,
) -> ApiResult<RouteComparison> {
    let comparison = services
        .routing
        .compare_with_optimal(request.actual_km, &request.waypoints)
        .await?;
    Ok(Json(comparison))
}

async fn get_optimal_route(
    State(services): State<EnrichmentServices>,
    Json(request): Json<RouteRequest>,
) -> ApiResult<Route> {
    Ok(Json(services.routing.route_through(&request.waypoints).await?))
}

async fn get_weather(
    State(services): State<EnrichmentServices>,
    Query(position): Query<PositionQuery>,
) -> Json<EnrichmentBody<CurrentWeather>> {
    Json(services.weather.current(position.coordinate()).await.into())
}
