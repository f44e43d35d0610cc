//! Startup orchestration.
//!
//! Builds the process-wide components in dependency order: registry, cache
//! store, resolution cache, tracking service. Each is constructed once and
//! shared by `Arc`.

use std::sync::Arc;

use crate::config::TrackerConfig;
use crate::registry::{FileRegistry, SiteRegistry};
use crate::resolver::{CachePolicy, MemoryCacheStore, ResolutionCache, SiteMatcher};
use crate::tracking::TrackingService;

/// Build the tracking service around any registry.
pub fn build_service(config: &TrackerConfig, registry: Arc<dyn SiteRegistry>) -> Arc<TrackingService> {
    let cache = ResolutionCache::new(
        registry,
        Arc::new(MemoryCacheStore::new()),
        SiteMatcher::new(config.tracker.catch_all_site_id),
        CachePolicy::from(&config.cache),
    );

    tracing::info!(
        catch_all_site_id = config.tracker.catch_all_site_id,
        cache_enabled = config.cache.enabled,
        cache_ttl_secs = config.cache.ttl_secs,
        invalidate_on_registry_change = config.cache.invalidate_on_registry_change,
        "Resolution cache ready"
    );

    Arc::new(TrackingService::new(Arc::new(cache), config.tracker.clone()))
}

/// Build the file registry named in the configuration.
///
/// A missing file is not fatal: requests fail with "registry unavailable"
/// until it appears.
pub fn file_registry(config: &TrackerConfig) -> FileRegistry {
    let registry = FileRegistry::new(&config.registry.path);
    match registry.load() {
        Ok(sites) => tracing::info!(path = %config.registry.path, sites = sites.len(), "Registry loaded"),
        Err(e) => tracing::warn!(path = %config.registry.path, error = %e, "Registry not readable yet"),
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;

    #[test]
    fn test_build_service_uses_config() {
        let mut config = TrackerConfig::default();
        config.tracker.catch_all_site_id = 1;
        config.tracker.base_url = Some("https://stats.example.com".into());

        let registry = MemoryRegistry::new();
        registry.set_main_url(1, "example.com");
        registry.set_main_url(2, "example");

        let service = build_service(&config, Arc::new(registry));
        let result = service.track(Some("https://example.com"), None).unwrap();
        assert_eq!(result.catch_all_site_id, 1);
        assert_eq!(result.matched_site_id, Some(2));
    }
}
