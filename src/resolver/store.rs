//! Key-value cache backends holding the location map.
//!
//! The resolution cache keeps one value, the whole [`LocationMap`], under a
//! fixed key. Backends only need whole-value fetch, save and delete with a
//! TTL applied to the value as a unit.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Expiry used when `now + ttl` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

use crate::registry::SiteId;

/// Resolved site per location, stored and expired as one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationMap {
    /// Registry generation the entries were computed against.
    pub generation: u64,
    /// Location string (exact, unnormalized) → matched site, `None` when nothing matched.
    pub entries: HashMap<String, Option<SiteId>>,
}

impl LocationMap {
    /// Create an empty map for a registry generation.
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            entries: HashMap::new(),
        }
    }

    /// Look up a location. The outer `Option` is the cache hit.
    pub fn get(&self, location: &str) -> Option<Option<SiteId>> {
        self.entries.get(location).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Errors raised by a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend could not be reached.
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Result type for cache backend operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// A key-value store with whole-value TTL.
pub trait CacheStore: Send + Sync + std::fmt::Debug {
    /// Fetch a live value. Missing and expired values are both `None`.
    fn fetch(&self, key: &str) -> CacheResult<Option<Arc<LocationMap>>>;

    /// Store `value` under `key`, replacing any previous value; it expires `ttl` from now.
    fn save(&self, key: &str, value: Arc<LocationMap>, ttl: Duration) -> CacheResult<()>;

    /// Remove the value under `key`. Returns whether a value was present.
    fn delete(&self, key: &str) -> CacheResult<bool>;
}

#[derive(Debug)]
struct StoredValue {
    value: Arc<LocationMap>,
    expires_at: Instant,
}

/// Process-local cache store.
#[derive(Debug, Clone, Default)]
pub struct MemoryCacheStore {
    inner: Arc<DashMap<String, StoredValue>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn fetch(&self, key: &str) -> CacheResult<Option<Arc<LocationMap>>> {
        let now = Instant::now();
        if let Some(stored) = self.inner.get(key) {
            if stored.expires_at > now {
                return Ok(Some(stored.value.clone()));
            }
        }
        // Expired values are evicted lazily; a concurrent save may have replaced it already.
        self.inner.remove_if(key, |_, stored| stored.expires_at <= now);
        Ok(None)
    }

    fn save(&self, key: &str, value: Arc<LocationMap>, ttl: Duration) -> CacheResult<()> {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        self.inner.insert(key.to_string(), StoredValue { value, expires_at });
        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<bool> {
        Ok(self.inner.remove(key).is_some())
    }
}
