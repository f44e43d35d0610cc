//! In-memory site registry.
//!
//! Used when sites are managed programmatically (embedding, tests). Every
//! mutation bumps the generation so a cache can notice the change.

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::registry::types::{RegistryError, RegistryResult, SiteId, SiteRecord, SiteUrl};
use crate::registry::{query_candidates, SiteRegistry};

/// A thread-safe registry held in memory.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    sites: DashMap<SiteId, SiteRecord>,
    generation: AtomicU64,
    reads: AtomicU64,
    offline: AtomicBool,
}

impl MemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the given sites.
    pub fn from_sites(sites: impl IntoIterator<Item = SiteRecord>) -> Self {
        let registry = Self::new();
        for site in sites {
            registry.sites.insert(site.id, site);
        }
        registry
    }

    /// Insert or replace a site.
    pub fn upsert_site(&self, site: SiteRecord) {
        self.sites.insert(site.id, site);
        self.bump();
    }

    /// Set the main URL of a site, creating the site if needed.
    pub fn set_main_url(&self, site_id: SiteId, url: impl Into<String>) {
        self.sites
            .entry(site_id)
            .or_insert_with(|| SiteRecord { id: site_id, ..Default::default() })
            .main_url = Some(url.into());
        self.bump();
    }

    /// Add an additional URL to a site, creating the site if needed.
    pub fn add_url(&self, site_id: SiteId, url: impl Into<String>) {
        self.sites
            .entry(site_id)
            .or_insert_with(|| SiteRecord { id: site_id, ..Default::default() })
            .urls
            .push(url.into());
        self.bump();
    }

    /// Remove a site and all of its URLs.
    pub fn remove_site(&self, site_id: SiteId) -> Option<SiteRecord> {
        let removed = self.sites.remove(&site_id).map(|(_, site)| site);
        if removed.is_some() {
            self.bump();
        }
        removed
    }

    /// Simulate an outage: while offline every read fails.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of candidate queries served (including failed ones).
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl SiteRegistry for MemoryRegistry {
    fn candidates(&self, location: &str, exclude: SiteId) -> RegistryResult<Vec<SiteUrl>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(RegistryError::Unavailable("registry is offline".to_string()));
        }

        let snapshot: Vec<SiteRecord> = self.sites.iter().map(|r| r.value().clone()).collect();
        Ok(query_candidates(&snapshot, location, exclude))
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
