use async_trait::async_trait;
use fjall::Keyspace;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tokio::task;

use crate::error::FleetGeoError;

/// Durable key/blob storage the geocoding cache persists through.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    async fn load(&self, key: &str) -> crate::Result<Option<Vec<u8>>>;
    async fn store(&self, key: &str, bytes: Vec<u8>) -> crate::Result<()>;
}

fn storage_error(err: impl std::fmt::Display) -> FleetGeoError {
    FleetGeoError::cache(err.to_string())
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> crate::Result<Option<Vec<u8>>> {
    Ok(store.get(key).map_err(storage_error)?.map(|v| v.to_vec()))
}

/// On-disk storage backed by a fjall keyspace
pub struct FjallStorage {
    store: Keyspace,
}

impl FjallStorage {
    pub fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let db = fjall::Database::builder(path.as_ref())
            .open()
            .map_err(storage_error)?;
        let store = db
            .keyspace("cache", fjall::KeyspaceCreateOptions::default)
            .map_err(storage_error)?;
        Ok(FjallStorage { store })
    }
}

#[async_trait]
impl CacheStorage for FjallStorage {
    #[tracing::instrument(name = "load_cache", level = "debug", skip(self))]
    async fn load(&self, key: &str) -> crate::Result<Option<Vec<u8>>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();
        let bytes = task::spawn_blocking(move || get_from_store(store, key_bytes))
            .await
            .map_err(storage_error)??;
        if bytes.is_none() {
            tracing::debug!("Key not found");
        }
        Ok(bytes)
    }

    #[tracing::instrument(name = "store_cache", level = "debug", skip(self, bytes), fields(len = bytes.len()))]
    async fn store(&self, key: &str, bytes: Vec<u8>) -> crate::Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        task::spawn_blocking(move || store.insert(key, bytes))
            .await
            .map_err(storage_error)?
            .map_err(storage_error)?;
        Ok(())
    }
}

/// Process-local storage used when persistence is disabled and in tests
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn load(&self, key: &str) -> crate::Result<Option<Vec<u8>>> {
        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.get(key).cloned())
    }

    async fn store(&self, key: &str, bytes: Vec<u8>) -> crate::Result<()> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.insert(key.to_string(), bytes);
        Ok(())
    }
}
