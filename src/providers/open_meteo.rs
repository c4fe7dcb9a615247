//! Open-Meteo current-weather adapter.

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use super::http;
use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::models::Coordinate;
use crate::weather::{ForecastResponse, WeatherSource};

/// A single location yields an object, several an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<ForecastResponse>),
    One(ForecastResponse),
}

impl From<OneOrMany> for Vec<ForecastResponse> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::Many(forecasts) => forecasts,
            OneOrMany::One(forecast) => vec![forecast],
        }
    }
}

pub struct OpenMeteoSource {
    client: ClientWithMiddleware,
    base_url: String,
}

impl OpenMeteoSource {
    pub fn new(config: &UpstreamConfig, user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http::build_client(config, user_agent)?,
            base_url: config.base_url.clone(),
        })
    }
}

fn joined(points: &[Coordinate], component: fn(&Coordinate) -> f64) -> String {
    points
        .iter()
        .map(|point| component(point).to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl WeatherSource for OpenMeteoSource {
    async fn current(&self, points: &[Coordinate]) -> Result<Vec<ForecastResponse>, UpstreamError> {
        let url = http::endpoint(
            &self.base_url,
            "forecast",
            &[
                ("latitude", joined(points, |p| p.latitude)),
                ("longitude", joined(points, |p| p.longitude)),
                ("current_weather", "true".to_string()),
                ("timezone", "auto".to_string()),
            ],
        )?;
        let forecasts: OneOrMany = http::send_json(self.client.get(url)).await?;
        Ok(forecasts.into())
    }
}
