//! Reverse geocoding with a persistent, TTL-bounded cache.
//!
//! Entries are keyed by the coordinate rounded to three decimals. The cache is
//! hydrated from durable storage on first use and the whole map is written back
//! after every successful lookup. Upstream calls are spaced by a shared token
//! bucket; cache hits never wait.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::cache::CacheStorage;
use crate::enrichment::Enrichment;
use crate::error::UpstreamError;
use crate::health::{ApiHealth, ApiSource};
use crate::labels::{BuiltinLabels, Label, LabelResolver, Locale};
use crate::models::{Address, Coordinate};
use crate::rate_limit::RequestSpacing;

/// Storage key of the persisted cache blob
pub const GEOCODING_CACHE_KEY: &str = "fleetview-geocoding-cache-v1";

pub const GEOCODING_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Reverse geocoding payload; every field may be missing.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ReverseGeocodeResponse {
    pub display_name: Option<String>,
    pub address: Option<RawAddress>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RawAddress {
    pub road: Option<String>,
    pub pedestrian: Option<String>,
    pub footway: Option<String>,
    pub house_number: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub municipality: Option<String>,
    pub city_district: Option<String>,
    pub suburb: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(
        &self,
        coordinate: Coordinate,
        locale: Locale,
    ) -> Result<ReverseGeocodeResponse, UpstreamError>;
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct StoredEntry {
    data: Address,
    #[serde(rename = "storedAt", with = "chrono::serde::ts_milliseconds")]
    stored_at: DateTime<Utc>,
}

/// A cached address as exposed to callers
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub key: String,
    pub value: Address,
    pub stored_at: DateTime<Utc>,
}

type Entries = RwLock<HashMap<String, StoredEntry>>;

pub struct GeocodeCache {
    geocoder: Arc<dyn ReverseGeocoder>,
    storage: Arc<dyn CacheStorage>,
    health: Arc<ApiHealth>,
    labels: Arc<dyn LabelResolver>,
    locale: Locale,
    spacing: RequestSpacing,
    ttl: Duration,
    entries: OnceCell<Entries>,
}

impl GeocodeCache {
    pub fn new(
        geocoder: Arc<dyn ReverseGeocoder>,
        storage: Arc<dyn CacheStorage>,
        health: Arc<ApiHealth>,
    ) -> Self {
        Self {
            geocoder,
            storage,
            health,
            labels: Arc::new(BuiltinLabels),
            locale: Locale::default(),
            spacing: RequestSpacing::default(),
            ttl: GEOCODING_TTL,
            entries: OnceCell::new(),
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

    /// Share a limiter with other callers of the same upstream
    #[must_use]
    pub fn with_spacing(mut self, spacing: RequestSpacing) -> Self {
        self.spacing = spacing;
        self
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Address of a position, from cache when possible.
    pub async fn resolve(&self, coordinate: Coordinate) -> Enrichment<Address> {
        if coordinate.is_absent() {
            return Enrichment::Skipped;
        }

        let key = coordinate.cache_key();
        if let Some(address) = self.lookup(&key).await {
            tracing::debug!(%key, "geocoding cache hit");
            return Enrichment::Ready(address);
        }
        tracing::debug!(%key, "geocoding cache miss");

        self.spacing.acquire().await;
        match self.geocoder.reverse(coordinate, self.locale).await {
            Ok(response) => {
                self.health.record(ApiSource::Geocoding, true);
                let address = map_address(&response, self.labels.as_ref(), self.locale);
                self.insert(key, address.clone()).await;
                Enrichment::Ready(address)
            }
            Err(err) => {
                self.health.record(ApiSource::Geocoding, false);
                tracing::warn!(%key, error = %err, "reverse geocoding failed");
                Enrichment::Unavailable(err)
            }
        }
    }

    /// Resolve positions in order; failed lookups are `None` and do not stop the batch.
    pub async fn resolve_batch(&self, coordinates: &[Coordinate]) -> Vec<Option<Address>> {
        let mut addresses = Vec::with_capacity(coordinates.len());
        let mut unresolved = 0usize;
        for coordinate in coordinates {
            let address = self.resolve(*coordinate).await.ok();
            if address.is_none() {
                unresolved += 1;
            }
            addresses.push(address);
        }
        tracing::info!(
            total = coordinates.len(),
            unresolved,
            "geocoding batch finished"
        );
        addresses
    }

    /// Cached address only, never touches the network.
    pub async fn peek(&self, coordinate: Coordinate) -> Option<Address> {
        if coordinate.is_absent() {
            return None;
        }
        self.lookup(&coordinate.cache_key()).await
    }

    /// All cached entries ordered by key
    pub async fn snapshot(&self) -> Vec<CacheEntry> {
        let entries = self.entries().await.read().unwrap_or_else(PoisonError::into_inner);
        let mut snapshot: Vec<CacheEntry> = entries
            .iter()
            .map(|(key, entry)| CacheEntry {
                key: key.clone(),
                value: entry.data.clone(),
                stored_at: entry.stored_at,
            })
            .collect();
        snapshot.sort_by(|a, b| a.key.cmp(&b.key));
        snapshot
    }

    async fn entries(&self) -> &Entries {
        self.entries
            .get_or_init(|| async { RwLock::new(self.hydrate().await) })
            .await
    }

    async fn lookup(&self, key: &str) -> Option<Address> {
        let entries = self.entries().await.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).map(|entry| entry.data.clone())
    }

    async fn insert(&self, key: String, address: Address) {
        let bytes = {
            let mut entries = self
                .entries()
                .await
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            entries.insert(
                key,
                StoredEntry {
                    data: address,
                    stored_at: Utc::now(),
                },
            );
            serde_json::to_vec(&*entries)
        };

        let persisted = match bytes {
            Ok(bytes) => self.storage.store(GEOCODING_CACHE_KEY, bytes).await,
            Err(err) => Err(crate::error::FleetGeoError::cache(err.to_string())),
        };
        if let Err(err) = persisted {
            tracing::warn!(error = %err, "failed to persist geocoding cache");
        }
    }

    async fn hydrate(&self) -> HashMap<String, StoredEntry> {
        let bytes = match self.storage.load(GEOCODING_CACHE_KEY).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return HashMap::new(),
            Err(err) => {
                tracing::warn!(error = %err, "could not read geocoding cache, starting empty");
                return HashMap::new();
            }
        };

        let stored: HashMap<String, StoredEntry> = match serde_json::from_slice(&bytes) {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(error = %err, "discarding malformed geocoding cache");
                return HashMap::new();
            }
        };

        let ttl = TimeDelta::from_std(self.ttl).unwrap_or(TimeDelta::MAX);
        let now = Utc::now();
        let total = stored.len();
        let fresh: HashMap<_, _> = stored
            .into_iter()
            .filter(|(_, entry)| now.signed_duration_since(entry.stored_at) <= ttl)
            .collect();
        tracing::debug!(total, fresh = fresh.len(), "hydrated geocoding cache");
        fresh
    }
}

fn first_present<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|candidate| candidate.as_deref())
        .find(|value| !value.trim().is_empty())
}

/// Map a raw geocoding payload onto an [`Address`] with a localized short form.
pub fn map_address(
    response: &ReverseGeocodeResponse,
    labels: &dyn LabelResolver,
    locale: Locale,
) -> Address {
    let raw = response.address.clone().unwrap_or_default();
    let street = first_present(&[&raw.road, &raw.pedestrian, &raw.footway]);
    let city = first_present(&[&raw.city, &raw.town, &raw.village, &raw.municipality]);
    let house_number = first_present(&[&raw.house_number]);

    let mut parts = Vec::with_capacity(2);
    if let Some(road) = first_present(&[&raw.road, &raw.pedestrian]) {
        match house_number {
            Some(number) => parts.push(format!("{road} {number}")),
            None => parts.push(road.to_string()),
        }
    }
    if let Some(city) = city {
        parts.push(city.to_string());
    }
    let short = if parts.is_empty() {
        labels.resolve(Label::UnknownLocation, locale)
    } else {
        parts.join(", ")
    };

    let owned = |value: Option<&str>| value.unwrap_or_default().to_string();
    Address {
        display_name: response.display_name.clone().unwrap_or_default(),
        street: owned(street),
        house_number: owned(house_number),
        city: owned(city),
        district: owned(first_present(&[&raw.city_district, &raw.suburb])),
        postcode: owned(first_present(&[&raw.postcode])),
        country: owned(first_present(&[&raw.country])),
        short,
    }
}
