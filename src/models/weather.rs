//! Current weather model

use serde::{Deserialize, Serialize};

/// Current conditions at a position
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    /// Temperature in Celsius, rounded
    pub temperature: i64,
    /// Wind speed in km/h, rounded
    pub wind_speed: i64,
    /// WMO weather interpretation code
    pub weather_code: u16,
    /// Localized description of the weather code
    pub label: String,
    pub icon: String,
    pub is_day: bool,
}
