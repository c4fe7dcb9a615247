//! Error types and handling for `FleetView` geospatial enrichment

use thiserror::Error;

/// Main error type for configuration, storage and bootstrap paths
#[derive(Error, Debug)]
pub enum FleetGeoError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Durable cache storage errors
    #[error("Cache error: {message}")]
    Cache { message: String },
}

impl FleetGeoError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            FleetGeoError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            FleetGeoError::Validation { message } => format!("Invalid input: {message}"),
            FleetGeoError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
        }
    }
}

/// Failure of a single call to a third-party service.
///
/// Payloads are plain strings so the error can be cloned into
/// [`crate::Enrichment::Unavailable`] and logged after the fact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl UpstreamError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Timeout(_))
    }
}

/// Routing failures are handed back to the caller instead of being swallowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("At least 2 waypoints required")]
    TooFewWaypoints,

    #[error("No route found")]
    NoRoute,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}
