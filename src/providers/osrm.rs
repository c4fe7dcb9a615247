//! OSRM driving-route adapter.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use super::http;
use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::models::Coordinate;
use crate::routing::{RouteResponse, RouteSource};

pub struct OsrmSource {
    client: ClientWithMiddleware,
    base_url: String,
}

impl OsrmSource {
    pub fn new(config: &UpstreamConfig, user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http::build_client(config, user_agent)?,
            base_url: config.base_url.clone(),
        })
    }
}

/// `lon,lat;lon,lat;...`
fn waypoint_path(waypoints: &[Coordinate]) -> String {
    waypoints
        .iter()
        .map(|point| format!("{},{}", point.longitude, point.latitude))
        .collect::<Vec<_>>()
        .join(";")
}

/// Status envelope OSRM sends with every response, including errors
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OsrmStatus {
    code: String,
}

/// OSRM answers an unroutable request with 400 and `{"code": "NoRoute"}`.
fn is_no_route(status: StatusCode, body: &[u8]) -> bool {
    status == StatusCode::BAD_REQUEST
        && serde_json::from_slice::<OsrmStatus>(body).is_ok_and(|envelope| envelope.code == "NoRoute")
}

#[async_trait]
impl RouteSource for OsrmSource {
    async fn route(&self, waypoints: &[Coordinate]) -> Result<RouteResponse, UpstreamError> {
        let url = http::endpoint(
            &self.base_url,
            &format!("route/v1/driving/{}", waypoint_path(waypoints)),
            &[
                ("overview", "full".to_string()),
                ("geometries", "geojson".to_string()),
                ("steps", "false".to_string()),
            ],
        )?;
        let (status, body) = http::send(self.client.get(url)).await?;
        if is_no_route(status, &body) {
            return Ok(RouteResponse::default());
        }
        if !status.is_success() {
            return Err(http::map_status_error(status, &body));
        }
        http::decode(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_lon_lat() {
        let path = waypoint_path(&[Coordinate::new(50.08, 14.42), Coordinate::new(49.19, 16.6)]);
        assert_eq!(path, "14.42,50.08;16.6,49.19");
    }

    #[test]
    fn parses_route_payload() {
        let response: RouteResponse = http::decode(
            br#"{"code": "Ok", "routes": [{"distance": 1234.5, "duration": 300.2,
                "geometry": {"type": "LineString", "coordinates": [[14.42, 50.08], [14.43, 50.09]]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.routes.len(), 1);
        assert_eq!(response.routes[0].geometry.coordinates[1], vec![14.43, 50.09]);

        let empty: RouteResponse = http::decode(br#"{"code": "NoRoute"}"#).unwrap();
        assert!(empty.routes.is_empty());
    }

    #[test]
    fn bad_request_with_no_route_code_is_recognised() {
        let body = br#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        assert!(is_no_route(StatusCode::BAD_REQUEST, body));
        assert!(!is_no_route(StatusCode::BAD_REQUEST, br#"{"code": "InvalidQuery"}"#));
        assert!(!is_no_route(StatusCode::BAD_REQUEST, b"<html>"));
        assert!(!is_no_route(StatusCode::INTERNAL_SERVER_ERROR, body));
    }
}
