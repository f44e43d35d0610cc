//! Resolution cache: location → best-matching site, computed lazily.
//!
//! # Responsibilities
//! - Serve repeated locations without touching the registry
//! - On a miss, query the registry, match, and store the result
//! - Degrade to always-miss when the cache backend fails
//!
//! # Design Decisions
//! - The whole location map lives under one key with one TTL. Every write
//!   re-stores the map and restarts the countdown for all entries.
//! - Read-modify-write without locks: concurrent misses may overwrite each
//!   other's additions (last write wins). Matching is pure, so a lost entry
//!   only costs a later registry read.
//! - Registry changes are not seen until the map expires or is cleared,
//!   unless `invalidate_on_registry_change` is set.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;
use crate::observability::metrics;
use crate::registry::{SiteId, SiteRegistry};
use crate::resolver::matcher::SiteMatcher;
use crate::resolver::store::{CacheError, CacheStore, LocationMap};
use crate::resolver::{ResolveError, ResolveResult};

/// Key under which the location map is stored.
pub const LOCATION_MAP_KEY: &str = "site_tracker_location_map";

/// How the resolution cache behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    /// When false every lookup goes to the registry.
    pub enabled: bool,
    /// Lifetime of the location map, restarted on every write.
    pub ttl: Duration,
    /// Discard a map computed against an older registry generation.
    pub invalidate_on_registry_change: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl From<&CacheConfig> for CachePolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            ttl: Duration::from_secs(config.ttl_secs),
            invalidate_on_registry_change: config.invalidate_on_registry_change,
        }
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub enabled: bool,
    pub ttl_secs: u64,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub registry_reads: u64,
    pub cache_errors: u64,
    pub registry_generation: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    registry_reads: AtomicU64,
    cache_errors: AtomicU64,
}

/// Process-wide resolution cache, constructed once and shared by reference.
#[derive(Debug)]
pub struct ResolutionCache {
    registry: Arc<dyn SiteRegistry>,
    store: Arc<dyn CacheStore>,
    matcher: SiteMatcher,
    policy: CachePolicy,
    counters: Counters,
}

impl ResolutionCache {
    /// Create a cache in front of `registry`, storing its map in `store`.
    pub fn new(
        registry: Arc<dyn SiteRegistry>,
        store: Arc<dyn CacheStore>,
        matcher: SiteMatcher,
        policy: CachePolicy,
    ) -> Self {
        Self {
            registry,
            store,
            matcher,
            policy,
            counters: Counters::default(),
        }
    }

    /// The catch-all site id excluded from matching.
    pub fn catch_all(&self) -> SiteId {
        self.matcher.catch_all()
    }

    /// The registry behind this cache.
    pub fn registry(&self) -> &Arc<dyn SiteRegistry> {
        &self.registry
    }

    /// Resolve `location` to its best-matching site, using the cache when possible.
    ///
    /// `Ok(None)` means resolution succeeded and no site matched. Registry
    /// failures are returned as errors; cache backend failures are not.
    pub fn get_or_compute(&self, location: &str) -> ResolveResult<Option<SiteId>> {
        if location.is_empty() {
            return Ok(None);
        }
        if !self.policy.enabled {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            return self.compute(location);
        }

        let generation = self.registry.generation();
        let cached = self.load_map(generation);

        if let Some(hit) = cached.as_deref().and_then(|map| map.get(location)) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            metrics::record_cache_lookup(true);
            tracing::trace!(location = %location, site_id = ?hit, "Resolution cache hit");
            return Ok(hit);
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        metrics::record_cache_lookup(false);

        let resolved = self.compute(location)?;

        let mut updated = match cached {
            Some(map) => Arc::unwrap_or_clone(map),
            None => LocationMap::new(generation),
        };
        updated.entries.insert(location.to_string(), resolved);
        let entries = updated.len();

        match self.store.save(LOCATION_MAP_KEY, Arc::new(updated), self.policy.ttl) {
            Ok(()) => metrics::record_cache_entries(entries),
            Err(e) => self.cache_failed("save", &e),
        }

        Ok(resolved)
    }

    /// Drop every cached resolution. Returns whether a map was present.
    pub fn clear(&self) -> Result<bool, CacheError> {
        let removed = self.store.delete(LOCATION_MAP_KEY)?;
        metrics::record_cache_entries(0);
        tracing::info!(removed, "Resolution cache cleared");
        Ok(removed)
    }

    /// Current counters and map size.
    pub fn stats(&self) -> CacheStats {
        let entries = match self.store.fetch(LOCATION_MAP_KEY) {
            Ok(map) => map.map(|m| m.len()).unwrap_or(0),
            Err(_) => 0,
        };

        CacheStats {
            enabled: self.policy.enabled,
            ttl_secs: self.policy.ttl.as_secs(),
            entries,
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            registry_reads: self.counters.registry_reads.load(Ordering::Relaxed),
            cache_errors: self.counters.cache_errors.load(Ordering::Relaxed),
            registry_generation: self.registry.generation(),
        }
    }

    /// Fetch the stored map, treating backend failures and stale generations as empty.
    fn load_map(&self, generation: u64) -> Option<Arc<LocationMap>> {
        let map = match self.store.fetch(LOCATION_MAP_KEY) {
            Ok(map) => map?,
            Err(e) => {
                self.cache_failed("fetch", &e);
                return None;
            }
        };

        if self.policy.invalidate_on_registry_change && map.generation != generation {
            tracing::debug!(
                cached = map.generation,
                current = generation,
                "Registry changed, discarding location map"
            );
            return None;
        }
        Some(map)
    }

    fn compute(&self, location: &str) -> ResolveResult<Option<SiteId>> {
        self.counters.registry_reads.fetch_add(1, Ordering::Relaxed);

        let candidates = match self.registry.candidates(location, self.matcher.catch_all()) {
            Ok(candidates) => candidates,
            Err(e) => {
                metrics::record_resolution("failed");
                tracing::error!(location = %location, error = %e, "Registry lookup failed");
                return Err(ResolveError::Registry(e));
            }
        };

        let resolved = self.matcher.resolve(location, &candidates);
        metrics::record_resolution(if resolved.is_some() { "matched" } else { "unmatched" });
        tracing::debug!(
            location = %location,
            candidates = candidates.len(),
            site_id = ?resolved,
            "Resolved location"
        );
        Ok(resolved)
    }

    fn cache_failed(&self, op: &'static str, error: &CacheError) {
        self.counters.cache_errors.fetch_add(1, Ordering::Relaxed);
        metrics::record_cache_error(op);
        tracing::warn!(op, error = %error, "Cache backend failed, resolving without cache");
    }
}
