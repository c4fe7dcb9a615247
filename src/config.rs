//! Configuration management for the `FleetView` enrichment service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::FleetGeoError;
use crate::labels::Locale;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetViewConfig {
    /// Reverse geocoding (Nominatim)
    #[serde(default = "default_geocoding_config")]
    pub geocoding: UpstreamConfig,
    /// Elevation lookups (Open-Elevation)
    #[serde(default = "default_elevation_config")]
    pub elevation: UpstreamConfig,
    /// POI search (Overpass)
    #[serde(default = "default_overpass_config")]
    pub overpass: UpstreamConfig,
    /// Routing (OSRM)
    #[serde(default = "default_routing_config")]
    pub routing: UpstreamConfig,
    /// Current weather (Open-Meteo)
    #[serde(default = "default_weather_config")]
    pub weather: UpstreamConfig,
    /// Cache configuration
    #[serde(default = "default_cache_config")]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default = "default_logging_config")]
    pub logging: LoggingConfig,
    /// HTTP server configuration
    #[serde(default = "default_server_config")]
    pub server: ServerConfig,
    /// Default enrichment settings
    #[serde(default = "default_defaults_config")]
    pub defaults: DefaultsConfig,
}

/// Connection settings of one third-party API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL without trailing path separator
    #[serde(default)]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default)]
    pub max_retries: Option<u32>,
}

impl UpstreamConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }

    #[must_use]
    pub fn retries(&self) -> u32 {
        self.max_retries.unwrap_or(0)
    }
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Geocoding cache TTL in hours
    #[serde(default = "default_cache_ttl")]
    pub ttl_hours: u32,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
    /// Keep the geocoding cache on disk across restarts
    #[serde(default = "default_cache_persist")]
    pub persist: bool,
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl_hours) * 60 * 60)
    }

    /// Cache directory with a leading `~` expanded
    #[must_use]
    pub fn resolved_location(&self) -> PathBuf {
        expand_home(&self.location)
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Default enrichment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Label language (cs or en)
    #[serde(default = "default_locale")]
    pub locale: String,
    /// POI search radius in meters
    #[serde(default = "default_poi_radius")]
    pub poi_radius_m: u32,
    /// Maximum points per elevation lookup
    #[serde(default = "default_elevation_max_samples")]
    pub elevation_max_samples: u32,
    /// Minimum spacing between geocoding requests
    #[serde(default = "default_geocoding_spacing")]
    pub geocoding_spacing_ms: u64,
    /// User agent sent to every upstream
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl DefaultsConfig {
    /// Configured locale, falling back to Czech when unparseable
    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale.parse().unwrap_or_default()
    }

    #[must_use]
    pub fn geocoding_spacing(&self) -> Duration {
        Duration::from_millis(self.geocoding_spacing_ms)
    }
}

// Default value functions
fn upstream(base_url: &str, timeout_seconds: u32, max_retries: u32) -> UpstreamConfig {
    UpstreamConfig {
        base_url: base_url.to_string(),
        timeout_seconds,
        max_retries: Some(max_retries),
    }
}

fn default_geocoding_config() -> UpstreamConfig {
    // Nominatim forbids bursts, so failed lookups are never retried.
    upstream("https://nominatim.openstreetmap.org", 10, 0)
}

fn default_elevation_config() -> UpstreamConfig {
    upstream("https://api.open-elevation.com/api/v1", 15, 2)
}

fn default_overpass_config() -> UpstreamConfig {
    upstream("https://overpass-api.de/api", 15, 2)
}

fn default_routing_config() -> UpstreamConfig {
    upstream("https://router.project-osrm.org", 30, 2)
}

fn default_weather_config() -> UpstreamConfig {
    upstream("https://api.open-meteo.com/v1", 10, 3)
}

fn default_cache_ttl() -> u32 {
    24
}

fn default_cache_location() -> String {
    "~/.cache/fleetview".to_string()
}

fn default_cache_persist() -> bool {
    true
}

fn default_cache_config() -> CacheConfig {
    CacheConfig {
        ttl_hours: default_cache_ttl(),
        location: default_cache_location(),
        persist: default_cache_persist(),
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_logging_config() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        format: default_log_format(),
    }
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_server_config() -> ServerConfig {
    ServerConfig {
        host: default_server_host(),
        port: default_server_port(),
    }
}

fn default_locale() -> String {
    "cs".to_string()
}

fn default_poi_radius() -> u32 {
    2000
}

fn default_elevation_max_samples() -> u32 {
    100
}

fn default_geocoding_spacing() -> u64 {
    1100
}

fn default_user_agent() -> String {
    format!("fleetview-geo/{}", crate::VERSION)
}

fn default_defaults_config() -> DefaultsConfig {
    DefaultsConfig {
        locale: default_locale(),
        poi_radius_m: default_poi_radius(),
        elevation_max_samples: default_elevation_max_samples(),
        geocoding_spacing_ms: default_geocoding_spacing(),
        user_agent: default_user_agent(),
    }
}

fn fill_upstream(config: &mut UpstreamConfig, defaults: UpstreamConfig) {
    if config.base_url.is_empty() {
        config.base_url = defaults.base_url;
    }
    if config.timeout_seconds == 0 {
        config.timeout_seconds = defaults.timeout_seconds;
    }
    if config.max_retries.is_none() {
        config.max_retries = defaults.max_retries;
    }
}

/// Expand a leading `~` to the user's home directory
#[must_use]
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ if path == "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        _ => PathBuf::from(path),
    }
}

impl Default for FleetViewConfig {
    fn default() -> Self {
        Self {
            geocoding: default_geocoding_config(),
            elevation: default_elevation_config(),
            overpass: default_overpass_config(),
            routing: default_routing_config(),
            weather: default_weather_config(),
            cache: default_cache_config(),
            logging: default_logging_config(),
            server: default_server_config(),
            defaults: default_defaults_config(),
        }
    }
}

impl FleetViewConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. FLEETVIEW_ROUTING__TIMEOUT_SECONDS=20
        builder = builder.add_source(
            Environment::with_prefix("FLEETVIEW")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: FleetViewConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("fleetview").join("config.toml"))
    }

    fn upstreams(&self) -> [(&'static str, &UpstreamConfig); 5] {
        [
            ("geocoding", &self.geocoding),
            ("elevation", &self.elevation),
            ("overpass", &self.overpass),
            ("routing", &self.routing),
            ("weather", &self.weather),
        ]
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        fill_upstream(&mut self.geocoding, default_geocoding_config());
        fill_upstream(&mut self.elevation, default_elevation_config());
        fill_upstream(&mut self.overpass, default_overpass_config());
        fill_upstream(&mut self.routing, default_routing_config());
        fill_upstream(&mut self.weather, default_weather_config());

        if self.cache.ttl_hours == 0 {
            self.cache.ttl_hours = default_cache_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.locale.is_empty() {
            self.defaults.locale = default_locale();
        }
        if self.defaults.poi_radius_m == 0 {
            self.defaults.poi_radius_m = default_poi_radius();
        }
        if self.defaults.elevation_max_samples == 0 {
            self.defaults.elevation_max_samples = default_elevation_max_samples();
        }
        if self.defaults.user_agent.is_empty() {
            self.defaults.user_agent = default_user_agent();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_upstreams()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_upstreams(&self) -> Result<()> {
        for (name, upstream) in self.upstreams() {
            if !upstream.base_url.starts_with("http://") && !upstream.base_url.starts_with("https://") {
                return Err(FleetGeoError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }

            if upstream.timeout_seconds > 300 {
                return Err(FleetGeoError::config(format!(
                    "{name} timeout cannot exceed 300 seconds"
                ))
                .into());
            }

            if upstream.retries() > 10 {
                return Err(FleetGeoError::config(format!(
                    "{name} max retries cannot exceed 10"
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.cache.ttl_hours > 168 {
            return Err(FleetGeoError::config("Cache TTL cannot exceed 168 hours (1 week)").into());
        }

        if self.defaults.geocoding_spacing_ms < 1000 {
            return Err(FleetGeoError::config(
                "Geocoding spacing cannot be below 1000 ms (Nominatim allows one request per second)",
            )
            .into());
        }

        if self.defaults.poi_radius_m > 50_000 {
            return Err(FleetGeoError::config("POI radius cannot exceed 50000 m").into());
        }

        if self.defaults.elevation_max_samples > 1000 {
            return Err(FleetGeoError::config("Elevation samples cannot exceed 1000").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(FleetGeoError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(FleetGeoError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        self.defaults
            .locale
            .parse::<Locale>()
            .map_err(|err| FleetGeoError::config(err.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = FleetViewConfig::default();
        assert_eq!(config.geocoding.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.geocoding.retries(), 0);
        assert_eq!(config.routing.timeout(), Duration::from_secs(30));
        assert_eq!(config.elevation.timeout_seconds, 15);
        assert_eq!(config.overpass.timeout_seconds, 15);
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.cache.ttl(), Duration::from_secs(24 * 60 * 60));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.defaults.locale(), Locale::Cs);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = FleetViewConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = FleetViewConfig::default();
        config.routing.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("routing timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_rejects_fast_geocoding() {
        let mut config = FleetViewConfig::default();
        config.defaults.geocoding_spacing_ms = 200;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_unknown_locale() {
        let mut config = FleetViewConfig::default();
        config.defaults.locale = "de".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("unsupported locale"));
    }

    #[test]
    fn test_apply_defaults_fills_partial_sections() {
        let mut config = FleetViewConfig::default();
        config.overpass = UpstreamConfig {
            base_url: "https://overpass.example.org/api".to_string(),
            timeout_seconds: 0,
            max_retries: None,
        };
        config.apply_defaults();
        assert_eq!(config.overpass.base_url, "https://overpass.example.org/api");
        assert_eq!(config.overpass.timeout_seconds, 15);
        assert_eq!(config.overpass.retries(), 2);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[geocoding]\nbase_url = \"http://localhost:7070\"\n\n[cache]\npersist = false\n\n[defaults]\nlocale = \"en\""
        )
        .unwrap();

        let config = FleetViewConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.geocoding.base_url, "http://localhost:7070");
        assert_eq!(config.geocoding.timeout_seconds, 10);
        assert!(!config.cache.persist);
        assert_eq!(config.defaults.locale(), Locale::En);
        assert_eq!(config.elevation.base_url, "https://api.open-elevation.com/api/v1");
    }

    #[test]
    fn test_environment_variable_override() {
        // SAFETY: Test environment, setting test values only
        unsafe {
            env::set_var("FLEETVIEW_WEATHER__TIMEOUT_SECONDS", "25");
        }

        let result = FleetViewConfig::load_from_path(Some(PathBuf::from("does-not-exist.toml")));

        // SAFETY: Test cleanup
        unsafe {
            env::remove_var("FLEETVIEW_WEATHER__TIMEOUT_SECONDS");
        }

        let config = result.unwrap();
        assert_eq!(config.weather.timeout_seconds, 25);
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
    }

    #[test]
    fn test_config_path_generation() {
        let path = FleetViewConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("fleetview"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/var/cache/x"), PathBuf::from("/var/cache/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/.cache/fleetview"), home.join(".cache/fleetview"));
        }
    }
}
