//! Point-of-interest models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FleetGeoError;

/// OSM `amenity` values fleet operators search for
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PoiCategory {
    Fuel,
    Parking,
    CarRepair,
    ChargingStation,
}

impl PoiCategory {
    pub const ALL: [PoiCategory; 4] = [
        PoiCategory::Fuel,
        PoiCategory::Parking,
        PoiCategory::CarRepair,
        PoiCategory::ChargingStation,
    ];

    /// Value of the `amenity` tag
    #[must_use]
    pub fn as_tag(self) -> &'static str {
        match self {
            PoiCategory::Fuel => "fuel",
            PoiCategory::Parking => "parking",
            PoiCategory::CarRepair => "car_repair",
            PoiCategory::ChargingStation => "charging_station",
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_tag() == tag)
    }

    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            PoiCategory::Fuel => "⛽",
            PoiCategory::Parking => "🅿️",
            PoiCategory::CarRepair => "🔧",
            PoiCategory::ChargingStation => "🔌",
        }
    }
}

impl fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for PoiCategory {
    type Err = FleetGeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s.trim())
            .ok_or_else(|| FleetGeoError::validation(format!("unknown POI category '{s}'")))
    }
}

/// Fuel types advertised by a station
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct FuelOptions {
    pub diesel: bool,
    pub lpg: bool,
    pub electric: bool,
}

/// A point of interest near a query origin
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    pub id: i64,
    /// Raw `amenity` tag, `unknown` when missing
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub brand: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub opening_hours: String,
    pub phone: String,
    pub website: String,
    pub fuel: FuelOptions,
    pub icon: String,
    /// Meters from the query origin
    pub distance: f64,
}
