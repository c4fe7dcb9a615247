//! Overpass interpreter adapter.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest_middleware::ClientWithMiddleware;

use super::http;
use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::pois::{OverpassResponse, PoiSource};

pub struct OverpassSource {
    client: ClientWithMiddleware,
    base_url: String,
}

impl OverpassSource {
    pub fn new(config: &UpstreamConfig, user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http::build_client(config, user_agent)?,
            base_url: config.base_url.clone(),
        })
    }
}

fn form_body(query: &str) -> String {
    format!("data={}", urlencoding::encode(query))
}

#[async_trait]
impl PoiSource for OverpassSource {
    async fn query(&self, query: &str) -> Result<OverpassResponse, UpstreamError> {
        let url = http::endpoint(&self.base_url, "interpreter", &[])?;
        let request = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form_body(query));
        http::send_json(request).await
    }
}
