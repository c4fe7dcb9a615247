use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{RoutingError, UpstreamError};
use crate::health::{ApiHealth, ApiSource};
use crate::models::{Coordinate, Route, RouteComparison, RouteRating};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RouteResponse {
    #[serde(default)]
    pub routes: Vec<RawRoute>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct RawRoute {
    pub distance: f64,
    pub duration: f64,
    pub geometry: RawGeometry,
}

/// GeoJSON line string, `[lon, lat]` pairs
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct RawGeometry {
    pub coordinates: Vec<Vec<f64>>,
}

#[async_trait]
pub trait RouteSource: Send + Sync {
    async fn route(&self, waypoints: &[Coordinate]) -> Result<RouteResponse, UpstreamError>;
}

pub struct RoutePlanner {
    source: Arc<dyn RouteSource>,
    health: Arc<ApiHealth>,
}

impl RoutePlanner {
    pub fn new(source: Arc<dyn RouteSource>, health: Arc<ApiHealth>) -> Self {
        Self { source, health }
    }

    pub async fn route(&self, start: Coordinate, end: Coordinate) -> Result<Route, RoutingError> {
        self.route_through(&[start, end]).await
    }

    #[instrument(skip(self, waypoints), fields(waypoints = waypoints.len()))]
    pub async fn route_through(&self, waypoints: &[Coordinate]) -> Result<Route, RoutingError> {
        if waypoints.len() < 2 {
            return Err(RoutingError::TooFewWaypoints);
        }

        let response = match self.source.route(waypoints).await {
            Ok(response) => {
                self.health.record(ApiSource::Routing, true);
                response
            }
            Err(err) => {
                self.health.record(ApiSource::Routing, false);
                return Err(err.into());
            }
        };

        let raw = response
            .routes
            .into_iter()
            .next()
            .ok_or(RoutingError::NoRoute)?;
        Ok(to_route(raw))
    }

    /// Compare a driven distance with the optimal route through the same waypoints.
    pub async fn compare_with_optimal(
        &self,
        actual_km: f64,
        waypoints: &[Coordinate],
    ) -> Result<RouteComparison, RoutingError> {
        let optimal = self.route_through(waypoints).await?;
        Ok(compare(actual_km, optimal.distance / 1000.0))
    }
}

fn to_route(raw: RawRoute) -> Route {
    let geometry = raw
        .geometry
        .coordinates
        .iter()
        .filter_map(|pair| match pair.as_slice() {
            [lon, lat, ..] => Some(Coordinate::from_lon_lat(*lon, *lat)),
            _ => None,
        })
        .collect();

    #[allow(clippy::cast_possible_truncation)]
    let duration_min = (raw.duration / 60.0).round() as i64;
    Route {
        distance: raw.distance,
        duration: raw.duration,
        distance_km: format!("{:.1}", raw.distance / 1000.0),
        duration_min,
        geometry,
    }
}

/// Efficiency of a driven distance against the optimal one.
#[must_use]
pub fn compare(actual_km: f64, optimal_km: f64) -> RouteComparison {
    let valid = |km: f64| km.is_finite() && km > 0.0;
    if !valid(actual_km) || !valid(optimal_km) {
        return RouteComparison::unknown();
    }

    #[allow(clippy::cast_possible_truncation)]
    let efficiency = (optimal_km / actual_km * 100.0).round() as i64;
    RouteComparison {
        efficiency,
        difference: format!("{:.1}", actual_km - optimal_km),
        rating: RouteRating::from_efficiency(efficiency),
    }
}
