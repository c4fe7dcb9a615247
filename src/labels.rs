//! Locale-aware labels shared by every enrichment component.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FleetGeoError;
use crate::models::PoiCategory;

/// UI language of the generated labels
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Cs,
    En,
}

impl Locale {
    /// `Accept-Language` header value preferring this locale
    #[must_use]
    pub fn accept_language(self) -> &'static str {
        match self {
            Locale::En => "en,cs",
            Locale::Cs => "cs,en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::Cs => f.write_str("cs"),
            Locale::En => f.write_str("en"),
        }
    }
}

impl FromStr for Locale {
    type Err = FleetGeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cs" => Ok(Locale::Cs),
            "en" => Ok(Locale::En),
            other => Err(FleetGeoError::validation(format!(
                "unsupported locale '{other}', expected cs or en"
            ))),
        }
    }
}

/// Something that needs a human-readable name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// Fallback for addresses with neither street nor city
    UnknownLocation,
    /// Default name of an unnamed POI
    Poi(PoiCategory),
    /// WMO weather interpretation code
    Weather(u16),
}

/// Resolves labels for a locale; injected into components instead of being
/// read from ambient state.
pub trait LabelResolver: Send + Sync {
    fn resolve(&self, label: Label, locale: Locale) -> String;
}

/// Built-in Czech/English tables
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLabels;

impl LabelResolver for BuiltinLabels {
    fn resolve(&self, label: Label, locale: Locale) -> String {
        let (cs, en) = match label {
            Label::UnknownLocation => ("Neznámá poloha", "Unknown location"),
            Label::Poi(category) => poi_names(category),
            Label::Weather(code) => weather_entry(code).map_or(("Neznámé", "Unknown"), |entry| {
                (entry.cs, entry.en)
            }),
        };
        match locale {
            Locale::Cs => cs.to_string(),
            Locale::En => en.to_string(),
        }
    }
}

fn poi_names(category: PoiCategory) -> (&'static str, &'static str) {
    match category {
        PoiCategory::Fuel => ("Čerpací stanice", "Gas Station"),
        PoiCategory::Parking => ("Parkoviště", "Parking"),
        PoiCategory::CarRepair => ("Autoservis", "Car Service"),
        PoiCategory::ChargingStation => ("Nabíjecí stanice", "Charging Station"),
    }
}

struct WeatherEntry {
    code: u16,
    cs: &'static str,
    en: &'static str,
    icon: &'static str,
}

const fn entry(code: u16, cs: &'static str, en: &'static str, icon: &'static str) -> WeatherEntry {
    WeatherEntry { code, cs, en, icon }
}

const WEATHER_CODES: &[WeatherEntry] = &[
    entry(0, "Jasno", "Clear sky", "☀️"),
    entry(1, "Převážně jasno", "Mainly clear", "🌤️"),
    entry(2, "Polojasno", "Partly cloudy", "⛅"),
    entry(3, "Zataženo", "Overcast", "☁️"),
    entry(45, "Mlha", "Fog", "🌫️"),
    entry(48, "Námraza", "Rime fog", "🌫️"),
    entry(51, "Mrholení", "Light drizzle", "🌦️"),
    entry(53, "Mrholení", "Moderate drizzle", "🌦️"),
    entry(55, "Silné mrholení", "Dense drizzle", "🌧️"),
    entry(61, "Slabý déšť", "Light rain", "🌦️"),
    entry(63, "Déšť", "Moderate rain", "🌧️"),
    entry(65, "Silný déšť", "Heavy rain", "🌧️"),
    entry(66, "Mrznoucí déšť", "Light freezing rain", "🌨️"),
    entry(67, "Silný mrznoucí déšť", "Heavy freezing rain", "🌨️"),
    entry(71, "Slabé sněžení", "Light snow", "🌨️"),
    entry(73, "Sněžení", "Moderate snow", "❄️"),
    entry(75, "Silné sněžení", "Heavy snow", "❄️"),
    entry(77, "Sněhové zrno", "Snow grains", "❄️"),
    entry(80, "Slabé přeháňky", "Light showers", "🌦️"),
    entry(81, "Přeháňky", "Moderate showers", "🌧️"),
    entry(82, "Silné přeháňky", "Violent showers", "⛈️"),
    entry(85, "Sněhové přeháňky", "Light snow showers", "🌨️"),
    entry(86, "Silné sněhové přeháňky", "Heavy snow showers", "🌨️"),
    entry(95, "Bouřka", "Thunderstorm", "⛈️"),
    entry(96, "Bouřka s krupobitím", "Thunderstorm with hail", "⛈️"),
    entry(99, "Silná bouřka", "Severe thunderstorm", "⛈️"),
];

fn weather_entry(code: u16) -> Option<&'static WeatherEntry> {
    WEATHER_CODES.iter().find(|entry| entry.code == code)
}

/// Icon for a WMO weather code; icons do not depend on the locale
#[must_use]
pub fn weather_icon(code: u16) -> &'static str {
    weather_entry(code).map_or("❓", |entry| entry.icon)
}
