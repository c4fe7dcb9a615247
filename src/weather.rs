use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::enrichment::Enrichment;
use crate::error::UpstreamError;
use crate::health::{ApiHealth, ApiSource};
use crate::labels::{BuiltinLabels, Label, LabelResolver, Locale, weather_icon};
use crate::models::{Coordinate, CurrentWeather};

/// Forecast response; only the current conditions block is read
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ForecastResponse {
    #[serde(default)]
    pub current_weather: Option<CurrentWeatherData>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct CurrentWeatherData {
    pub temperature: f64,
    pub windspeed: f64,
    pub weathercode: Option<u16>,
    pub is_day: u8,
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// One forecast per coordinate, in input order
    async fn current(&self, points: &[Coordinate]) -> Result<Vec<ForecastResponse>, UpstreamError>;
}

pub struct WeatherService {
    source: Arc<dyn WeatherSource>,
    health: Arc<ApiHealth>,
    labels: Arc<dyn LabelResolver>,
    locale: Locale,
}

impl WeatherService {
    pub fn new(source: Arc<dyn WeatherSource>, health: Arc<ApiHealth>) -> Self {
        Self {
            source,
            health,
            labels: Arc::new(BuiltinLabels),
            locale: Locale::default(),
        }
    }

    #[must_use]
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    #[must_use]
    pub fn with_labels(mut self, labels: Arc<dyn LabelResolver>) -> Self {
        self.labels = labels;
        self
    }

    pub async fn current(&self, point: Coordinate) -> Enrichment<CurrentWeather> {
        if point.is_absent() {
            return Enrichment::Skipped;
        }
        match self.fetch(&[point]).await {
            Ok(mut forecasts) => match forecasts.pop().flatten() {
                Some(weather) => Enrichment::Ready(weather),
                None => Enrichment::Skipped,
            },
            Err(err) => Enrichment::Unavailable(err),
        }
    }

    /// Current weather for many positions in one request; on failure every entry is `None`.
    pub async fn current_batch(&self, points: &[Coordinate]) -> Vec<Option<CurrentWeather>> {
        let present: Vec<Coordinate> = points.iter().copied().filter(|p| !p.is_absent()).collect();
        if present.is_empty() {
            return vec![None; points.len()];
        }

        let Ok(fetched) = self.fetch(&present).await else {
            return vec![None; points.len()];
        };

        let mut fetched = fetched.into_iter();
        points
            .iter()
            .map(|point| {
                if point.is_absent() {
                    None
                } else {
                    fetched.next().flatten()
                }
            })
            .collect()
    }

    async fn fetch(&self, points: &[Coordinate]) -> Result<Vec<Option<CurrentWeather>>, UpstreamError> {
        match self.source.current(points).await {
            Ok(forecasts) => {
                self.health.record(ApiSource::Weather, true);
                Ok(forecasts
                    .iter()
                    .map(|forecast| forecast.current_weather.map(|data| self.to_weather(data)))
                    .collect())
            }
            Err(err) => {
                self.health.record(ApiSource::Weather, false);
                tracing::warn!(points = points.len(), error = %err, "weather lookup failed");
                Err(err)
            }
        }
    }

    fn to_weather(&self, data: CurrentWeatherData) -> CurrentWeather {
        // Codes outside the WMO table resolve to the "unknown" label.
        let code = data.weathercode.unwrap_or(u16::MAX);
        CurrentWeather {
            temperature: round_half_up(data.temperature),
            wind_speed: round_half_up(data.windspeed),
            weather_code: code,
            label: self.labels.resolve(Label::Weather(code), self.locale),
            icon: weather_icon(code).to_string(),
            is_day: data.is_day == 1,
        }
    }
}

/// Nearest integer with halves rounded towards positive infinity (-1.5 becomes -1).
#[allow(clippy::cast_possible_truncation)]
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
