//! Per-upstream reliability state for the status display.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Upstreams whose reliability is tracked, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiSource {
    GpsDozor,
    Weather,
    Geocoding,
    Routing,
    Overpass,
    Elevation,
}

impl ApiSource {
    pub const ALL: [ApiSource; 6] = [
        ApiSource::GpsDozor,
        ApiSource::Weather,
        ApiSource::Geocoding,
        ApiSource::Routing,
        ApiSource::Overpass,
        ApiSource::Elevation,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            ApiSource::GpsDozor => "gpsdozor",
            ApiSource::Weather => "weather",
            ApiSource::Geocoding => "geocoding",
            ApiSource::Routing => "routing",
            ApiSource::Overpass => "overpass",
            ApiSource::Elevation => "elevation",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ApiSource::GpsDozor => "GPS Dozor API",
            ApiSource::Weather => "Open-Meteo",
            ApiSource::Geocoding => "Nominatim",
            ApiSource::Routing => "OSRM",
            ApiSource::Overpass => "Overpass",
            ApiSource::Elevation => "Elevation",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|source| source.key() == key)
    }
}

/// Last known reliability of one upstream
#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthState {
    /// `None` until the first call completes
    pub ok: Option<bool>,
    pub last_ok_at: Option<DateTime<Utc>>,
    pub last_fail_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ApiHealthStatus {
    pub key: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub state: HealthState,
}

/// Process-lifetime health registry shared by every fetching component.
#[derive(Debug)]
pub struct ApiHealth {
    entries: Vec<(ApiSource, Mutex<HealthState>)>,
}

impl Default for ApiHealth {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiHealth {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: ApiSource::ALL
                .into_iter()
                .map(|source| (source, Mutex::new(HealthState::default())))
                .collect(),
        }
    }

    /// Unknown keys are ignored.
    pub fn mark_success(&self, key: &str) {
        if let Some(source) = ApiSource::from_key(key) {
            self.record(source, true);
        }
    }

    /// Unknown keys are ignored.
    pub fn mark_failure(&self, key: &str) {
        if let Some(source) = ApiSource::from_key(key) {
            self.record(source, false);
        }
    }

    pub fn record(&self, source: ApiSource, ok: bool) {
        let Some((_, state)) = self.entries.iter().find(|(s, _)| *s == source) else {
            return;
        };
        let now = Utc::now();
        let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
        state.ok = Some(ok);
        if ok {
            state.last_ok_at = Some(now);
        } else {
            state.last_fail_at = Some(now);
            tracing::debug!(source = source.key(), "upstream marked as failing");
        }
    }

    #[must_use]
    pub fn status(&self, key: &str) -> Option<ApiHealthStatus> {
        let source = ApiSource::from_key(key)?;
        self.entries
            .iter()
            .find(|(s, _)| *s == source)
            .map(|(source, state)| Self::to_status(*source, state))
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<ApiHealthStatus> {
        self.entries
            .iter()
            .map(|(source, state)| Self::to_status(*source, state))
            .collect()
    }

    fn to_status(source: ApiSource, state: &Mutex<HealthState>) -> ApiHealthStatus {
        ApiHealthStatus {
            key: source.key(),
            label: source.label(),
            state: *state.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }
}
