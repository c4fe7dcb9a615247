//! Open-Elevation lookup adapter.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};

use super::http;
use crate::config::UpstreamConfig;
use crate::elevation::{ElevationPoint, ElevationSource};
use crate::error::UpstreamError;
use crate::models::Coordinate;

#[derive(Debug, Serialize)]
struct LookupRequest<'a> {
    locations: &'a [Coordinate],
}

#[derive(Debug, Deserialize, Default)]
struct LookupResponse {
    #[serde(default)]
    results: Vec<ElevationPoint>,
}

pub struct OpenElevationSource {
    client: ClientWithMiddleware,
    base_url: String,
}

impl OpenElevationSource {
    pub fn new(config: &UpstreamConfig, user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http::build_client(config, user_agent)?,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl ElevationSource for OpenElevationSource {
    async fn lookup(&self, points: &[Coordinate]) -> Result<Vec<ElevationPoint>, UpstreamError> {
        let url = http::endpoint(&self.base_url, "lookup", &[])?;
        let body = serde_json::to_vec(&LookupRequest { locations: points })
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let response: LookupResponse = http::send_json(request).await?;
        Ok(response.results)
    }

    async fn lookup_one(&self, point: Coordinate) -> Result<Option<f64>, UpstreamError> {
        let url = http::endpoint(
            &self.base_url,
            "lookup",
            &[("locations", format!("{},{}", point.latitude, point.longitude))],
        )?;
        let response: LookupResponse = http::send_json(self.client.get(url)).await?;
        Ok(response.results.first().and_then(|result| result.elevation))
    }
}
