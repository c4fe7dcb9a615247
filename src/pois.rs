//! Nearby points of interest from OpenStreetMap data.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::enrichment::Enrichment;
use crate::error::UpstreamError;
use crate::geo;
use crate::health::{ApiHealth, ApiSource};
use crate::labels::{BuiltinLabels, Label, LabelResolver, Locale};
use crate::models::{Coordinate, FuelOptions, Poi, PoiCategory};

pub const DEFAULT_GAS_STATION_RADIUS_M: u32 = 3000;
pub const DEFAULT_POI_RADIUS_M: u32 = 2000;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ElementCenter {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OverpassElement {
    #[serde(default)]
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<ElementCenter>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl OverpassElement {
    /// Nodes carry their own position, ways only a computed center.
    fn position(&self) -> Option<Coordinate> {
        let coordinate = match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => Coordinate::new(lat, lon),
            (_, _, Some(center)) => Coordinate::new(center.lat, center.lon),
            _ => return None,
        };
        (!coordinate.is_absent()).then_some(coordinate)
    }

    fn tag(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.tags.get(*name))
            .map(String::as_str)
            .find(|value| !value.is_empty())
    }

    fn flag(&self, name: &str) -> bool {
        self.tags.get(name).is_some_and(|value| value == "yes")
    }
}

#[async_trait]
pub trait PoiSource: Send + Sync {
    /// Run an Overpass QL query
    async fn query(&self, query: &str) -> Result<OverpassResponse, UpstreamError>;
}

pub struct PoiLocator {
    source: Arc<dyn PoiSource>,
    health: Arc<ApiHealth>,
    labels: Arc<dyn LabelResolver>,
    locale: Locale,
}

impl PoiLocator {
    pub fn new(source: Arc<dyn PoiSource>, health: Arc<ApiHealth>) -> Self {
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

    /// POIs of the given categories within `radius_m`, nearest first.
    pub async fn find_nearby(
        &self,
        origin: Coordinate,
        radius_m: u32,
        categories: &[PoiCategory],
    ) -> Enrichment<Vec<Poi>> {
        if origin.is_absent() || categories.is_empty() {
            return Enrichment::Skipped;
        }

        let query = build_query(origin, radius_m, categories);
        let response = match self.source.query(&query).await {
            Ok(response) => {
                self.health.record(ApiSource::Overpass, true);
                response
            }
            Err(err) => {
                self.health.record(ApiSource::Overpass, false);
                tracing::warn!(radius_m, error = %err, "POI search failed");
                return Enrichment::Unavailable(err);
            }
        };

        let mut pois: Vec<Poi> = response
            .elements
            .iter()
            .filter_map(|element| self.to_poi(element, origin))
            .collect();
        pois.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        tracing::debug!(found = pois.len(), radius_m, "POI search finished");
        Enrichment::Ready(pois)
    }

    pub async fn gas_stations(&self, origin: Coordinate, radius_m: Option<u32>) -> Enrichment<Vec<Poi>> {
        let radius = radius_m.unwrap_or(DEFAULT_GAS_STATION_RADIUS_M);
        self.find_nearby(origin, radius, &[PoiCategory::Fuel]).await
    }

    pub async fn parking(&self, origin: Coordinate, radius_m: Option<u32>) -> Enrichment<Vec<Poi>> {
        let radius = radius_m.unwrap_or(DEFAULT_POI_RADIUS_M);
        self.find_nearby(origin, radius, &[PoiCategory::Parking]).await
    }

    pub async fn all_fleet_pois(&self, origin: Coordinate, radius_m: Option<u32>) -> Enrichment<Vec<Poi>> {
        let radius = radius_m.unwrap_or(DEFAULT_POI_RADIUS_M);
        self.find_nearby(origin, radius, &PoiCategory::ALL).await
    }

    fn to_poi(&self, element: &OverpassElement, origin: Coordinate) -> Option<Poi> {
        let position = element.position()?;
        let amenity = element.tag(&["amenity"]);
        let category = amenity.and_then(PoiCategory::from_tag);

        let name = element
            .tag(&["name", "name:cs", "name:en"])
            .map(str::to_string)
            .or_else(|| category.map(|c| self.labels.resolve(Label::Poi(c), self.locale)))
            .or_else(|| amenity.map(str::to_string))
            .unwrap_or_else(|| "POI".to_string());

        let text = |names: &[&str]| element.tag(names).unwrap_or_default().to_string();
        Some(Poi {
            id: element.id,
            kind: amenity.unwrap_or("unknown").to_string(),
            name,
            brand: text(&["brand"]),
            latitude: position.latitude,
            longitude: position.longitude,
            address: format_address(element),
            opening_hours: text(&["opening_hours"]),
            phone: text(&["phone", "contact:phone"]),
            website: text(&["website", "contact:website"]),
            fuel: FuelOptions {
                diesel: element.flag("fuel:diesel"),
                lpg: element.flag("fuel:lpg"),
                electric: element.flag("fuel:electricity")
                    || category == Some(PoiCategory::ChargingStation),
            },
            icon: category.map_or("📍", PoiCategory::icon).to_string(),
            distance: geo::distance(&origin, &position),
        })
    }
}

/// "street[ number], city" from the `addr:*` tags
fn format_address(element: &OverpassElement) -> String {
    let mut parts = Vec::with_capacity(2);
    if let Some(street) = element.tag(&["addr:street"]) {
        match element.tag(&["addr:housenumber"]) {
            Some(number) => parts.push(format!("{street} {number}")),
            None => parts.push(street.to_string()),
        }
    }
    if let Some(city) = element.tag(&["addr:city"]) {
        parts.push(city.to_string());
    }
    parts.join(", ")
}

/// One composite query covering nodes and ways of every category.
#[must_use]
pub fn build_query(origin: Coordinate, radius_m: u32, categories: &[PoiCategory]) -> String {
    let around = format!("around:{radius_m},{},{}", origin.latitude, origin.longitude);
    let mut query = String::from("[out:json][timeout:10];\n(\n");
    for category in categories {
        let tag = category.as_tag();
        let _ = writeln!(query, "  node[\"amenity\"=\"{tag}\"]({around});");
        let _ = writeln!(query, "  way[\"amenity\"=\"{tag}\"]({around});");
    }
    query.push_str(");\nout center body qt 30;");
    query
}
