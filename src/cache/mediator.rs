//! Memoization of network requests through the cache store

use serde_json::Value;
use std::future::Future;
use std::path::PathBuf;

use super::{CacheError, CacheStore, RequestIdentity};

/// Where a looked-up payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    /// Already present in the store; no network access happened
    Hit,
    /// Fetched from the network and written to the store
    Fetched,
}

/// Payload returned by [`RequestCache::fetch_with_cache`]
#[derive(Debug, Clone)]
pub struct CacheLookup {
    pub value: Value,
    pub source: CacheSource,
}

/// Decides between returning a stored payload and fetching a new one
///
/// Owns the [`CacheStore`] for the lifetime of the process. The store is read
/// from disk once when the cache is opened; every miss updates it in memory and
/// saves it before returning, so later lookups in the same run see all earlier
/// writes.
#[derive(Debug)]
pub struct RequestCache {
    store: CacheStore,
}

impl RequestCache {
    /// Opens the cache backed by the file at `path`
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::from_store(CacheStore::load(path))
    }

    pub fn from_store(store: CacheStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Returns the payload for `identity`, fetching it only on a miss
    ///
    /// On a hit the stored value is returned and `fetcher` is never called. On
    /// a miss `fetcher` runs once; its result is stored, the store is saved, and
    /// the result is returned.
    ///
    /// # Errors
    /// * Whatever `fetcher` fails with, unchanged. Nothing is stored.
    /// * The save error (converted into `E`) if the store can't be written. The
    ///   new entry is dropped again so memory matches the file.
    pub async fn fetch_with_cache<F, Fut, E>(
        &mut self,
        identity: &RequestIdentity,
        fetcher: F,
    ) -> Result<CacheLookup, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
        E: From<CacheError>,
    {
        if let Some(value) = self.store.get(identity.as_str()) {
            tracing::info!(%identity, "Using cache");
            return Ok(CacheLookup {
                value: value.clone(),
                source: CacheSource::Hit,
            });
        }

        tracing::info!(%identity, "Fetching");
        let value = fetcher().await?;

        self.store.insert(identity.as_str(), value.clone());
        if let Err(e) = self.store.save() {
            self.store.remove(identity.as_str());
            return Err(e.into());
        }

        Ok(CacheLookup {
            value,
            source: CacheSource::Fetched,
        })
    }
}
