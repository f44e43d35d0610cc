//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the tracker
//! service. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::registry::SiteId;

/// Reserved id of the catch-all site tracked on every page.
pub const SITE_ALL: SiteId = 358;

/// Root configuration for the tracker service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TrackerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Tracking snippet settings.
    pub tracker: SnippetConfig,

    /// Site registry source.
    pub registry: RegistryConfig,

    /// Resolution cache settings.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin endpoint settings.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Settings that end up in the rendered tracking snippet.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SnippetConfig {
    /// Site id registered on every page, never a match target.
    pub catch_all_site_id: SiteId,

    /// Fixed analytics base URL (e.g., "https://stats.example.com").
    /// When unset, the base URL is derived from the request's scheme and host.
    pub base_url: Option<String>,

    /// Path of the tracking endpoint, appended to the base URL.
    pub tracker_path: String,

    /// Path of the client script, appended to the base URL.
    pub script_path: String,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            catch_all_site_id: SITE_ALL,
            base_url: None,
            tracker_path: "/matomo.php".to_string(),
            script_path: "/matomo.js".to_string(),
        }
    }
}

/// Site registry source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Path to the registry TOML file.
    pub path: String,

    /// Watch the registry file and bump its generation on change.
    pub watch: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: "sites.toml".to_string(),
            watch: true,
        }
    }
}

/// Resolution cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the location cache. Disabled means every request scans the registry.
    pub enabled: bool,

    /// Lifetime of the whole location map in seconds, refreshed on every write.
    pub ttl_secs: u64,

    /// Drop cached resolutions when the registry generation changes.
    pub invalidate_on_registry_change: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 24 * 60 * 60,
            invalidate_on_registry_change: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin endpoints.
    pub enabled: bool,

    /// Admin bind address. Keep it on loopback, the endpoints are unauthenticated.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.tracker.catch_all_site_id, 358);
        assert_eq!(config.cache.ttl_secs, 86_400);
        assert!(!config.cache.invalidate_on_registry_change);
        assert!(config.tracker.base_url.is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config: TrackerConfig = toml::from_str(
            r#"
            [tracker]
            base_url = "https://stats.example.com"

            [cache]
            ttl_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.tracker.base_url.as_deref(), Some("https://stats.example.com"));
        assert_eq!(config.tracker.tracker_path, "/matomo.php");
        assert_eq!(config.cache.ttl_secs, 60);
        assert!(config.cache.enabled);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
