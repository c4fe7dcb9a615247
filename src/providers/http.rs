//! Shared transport helpers: client construction, status mapping and decoding.

use reqwest::{StatusCode, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;

use crate::config::UpstreamConfig;
use crate::error::UpstreamError;

/// Build a client with the upstream's timeout and, when configured, transient retries.
pub fn build_client(
    config: &UpstreamConfig,
    user_agent: &str,
) -> Result<ClientWithMiddleware, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout())
        .user_agent(user_agent)
        .build()?;

    let mut builder = ClientBuilder::new(client);
    let retries = config.retries();
    if retries > 0 {
        let policy = ExponentialBackoff::builder().build_with_max_retries(retries);
        builder = builder.with(RetryTransientMiddleware::new_with_policy(policy));
    }
    Ok(builder.build())
}

/// `{base}/{path}?{params}`
pub fn endpoint(base: &str, path: &str, params: &[(&str, String)]) -> Result<Url, UpstreamError> {
    let raw = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    let url = if params.is_empty() {
        Url::parse(&raw)
    } else {
        Url::parse_with_params(&raw, params)
    };
    url.map_err(|err| UpstreamError::Transport(format!("invalid URL '{raw}': {err}")))
}

/// Send a request and return the status with the raw body, whatever the status.
pub async fn send(request: RequestBuilder) -> Result<(StatusCode, Vec<u8>), UpstreamError> {
    let response = request.send().await.map_err(map_middleware_error)?;
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    Ok((status, body.to_vec()))
}

/// Send a request and decode a successful JSON body.
pub async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, UpstreamError> {
    let (status, body) = send(request).await?;
    if !status.is_success() {
        return Err(map_status_error(status, &body));
    }
    decode(&body)
}

pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, UpstreamError> {
    serde_json::from_slice(body).map_err(|error| {
        UpstreamError::Decode(format!("invalid JSON payload: {error}; body: {}", body_preview(body)))
    })
}

fn map_middleware_error(error: reqwest_middleware::Error) -> UpstreamError {
    match error {
        reqwest_middleware::Error::Reqwest(error) => map_transport_error(error),
        reqwest_middleware::Error::Middleware(error) => UpstreamError::Transport(format!("{error:#}")),
    }
}

fn map_transport_error(error: reqwest::Error) -> UpstreamError {
    if error.is_timeout() {
        UpstreamError::Timeout(error.to_string())
    } else {
        UpstreamError::Transport(error.to_string())
    }
}

pub(crate) fn map_status_error(status: StatusCode, body: &[u8]) -> UpstreamError {
    let preview = body_preview(body);
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            UpstreamError::Timeout(format!("status {}", status.as_u16()))
        }
        _ => UpstreamError::Status {
            status: status.as_u16(),
            message: preview,
        },
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, true)]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, true)]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, false)]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, false)]
    fn maps_statuses(#[case] status: StatusCode, #[case] timeout: bool) {
        let error = map_status_error(status, b"{\"error\": \"busy\"}");
        assert_eq!(error.is_timeout(), timeout);
        if !timeout {
            assert!(matches!(error, UpstreamError::Status { status: s, .. } if s == status.as_u16()));
        }
    }

    #[test]
    fn truncates_long_bodies() {
        let body = "x ".repeat(200);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 163);
    }

    #[test]
    fn builds_endpoints() {
        let url = endpoint(
            "https://nominatim.openstreetmap.org/",
            "/reverse",
            &[("lat", "50.1".to_string()), ("format", "json".to_string())],
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://nominatim.openstreetmap.org/reverse?lat=50.1&format=json");
        assert!(endpoint("not a url", "x", &[]).is_err());
    }

    #[test]
    fn decode_failure_is_decode_error() {
        let result: Result<Vec<u8>, _> = decode(b"<html>");
        assert!(matches!(result, Err(UpstreamError::Decode(_))));
    }
}
