//! Nominatim reverse geocoding adapter.

use async_trait::async_trait;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest_middleware::ClientWithMiddleware;

use super::http;
use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::geocoding::{ReverseGeocodeResponse, ReverseGeocoder};
use crate::labels::Locale;
use crate::models::Coordinate;

/// Street-level detail
const ZOOM: &str = "16";

pub struct NominatimGeocoder {
    client: ClientWithMiddleware,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &UpstreamConfig, user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http::build_client(config, user_agent)?,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(
        &self,
        coordinate: Coordinate,
        locale: Locale,
    ) -> Result<ReverseGeocodeResponse, UpstreamError> {
        let url = http::endpoint(
            &self.base_url,
            "reverse",
            &[
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
                ("zoom", ZOOM.to_string()),
                ("addressdetails", "1".to_string()),
                ("format", "json".to_string()),
            ],
        )?;
        tracing::debug!(%url, "reverse geocoding");
        let request = self
            .client
            .get(url)
            .header(ACCEPT_LANGUAGE, locale.accept_language());
        http::send_json(request).await
    }
}
