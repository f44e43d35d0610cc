//! Request-level tracking flow.
//!
//! ```text
//! location, request base URL
//!     → reject empty location (registry untouched)
//!     → ResolutionCache::get_or_compute
//!     → TrackingResult { catch-all, matched site, endpoint }
//!     → snippet::render
//! ```

use arc_swap::ArcSwap;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{SnippetConfig, TrackerConfig};
use crate::registry::SiteId;
use crate::resolver::{ResolutionCache, ResolveError};
use crate::snippet::{self, TrackerEndpoint};

/// Message returned when the `location` parameter is missing.
pub const MISSING_LOCATION_MESSAGE: &str =
    "'location' parameter with the current URL must be provided!";

/// Errors that end a tracking request.
#[derive(Debug, Error)]
pub enum TrackError {
    /// No (or an empty) location was supplied.
    #[error("{}", MISSING_LOCATION_MESSAGE)]
    MissingInput,

    /// No base URL is configured and the request carried no usable Host.
    #[error("cannot determine the tracker base URL: no Host header")]
    MissingHost,

    /// The location could not be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Outcome of a successful tracking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingResult {
    pub catch_all_site_id: SiteId,
    pub matched_site_id: Option<SiteId>,
    pub endpoint: TrackerEndpoint,
}

impl TrackingResult {
    /// Render the tracking snippet for this result.
    pub fn render(&self) -> String {
        snippet::render(self.catch_all_site_id, self.matched_site_id, &self.endpoint)
    }
}

/// Resolves locations and builds tracking results.
#[derive(Debug)]
pub struct TrackingService {
    cache: Arc<ResolutionCache>,
    snippet: ArcSwap<SnippetConfig>,
}

impl TrackingService {
    pub fn new(cache: Arc<ResolutionCache>, snippet: SnippetConfig) -> Self {
        Self {
            cache,
            snippet: ArcSwap::from_pointee(snippet),
        }
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    /// Current snippet settings.
    pub fn snippet_config(&self) -> Arc<SnippetConfig> {
        self.snippet.load_full()
    }

    /// Apply a reloaded configuration. Only snippet URLs and paths change live.
    pub fn apply_config(&self, config: &TrackerConfig) {
        let next = config.tracker.clone();
        if next.catch_all_site_id != self.cache.catch_all() {
            tracing::warn!(
                current = self.cache.catch_all(),
                configured = next.catch_all_site_id,
                "Catch-all site id changed; restart to apply"
            );
        }
        // The resolution cache was built around the current catch-all id; keep them aligned.
        let next = SnippetConfig {
            catch_all_site_id: self.cache.catch_all(),
            ..next
        };
        self.snippet.store(Arc::new(next));
        tracing::info!("Snippet configuration reloaded");
    }

    /// Pick the tracker endpoint: configured base URL first, then the request's own.
    pub fn endpoint(&self, request_base: Option<&str>) -> Result<TrackerEndpoint, TrackError> {
        let config = self.snippet.load();
        let base = config
            .base_url
            .as_deref()
            .or(request_base)
            .ok_or(TrackError::MissingHost)?;
        Ok(TrackerEndpoint::from_config(base, &config))
    }

    /// Resolve `location` and build the tracking result.
    pub fn track(
        &self,
        location: Option<&str>,
        request_base: Option<&str>,
    ) -> Result<TrackingResult, TrackError> {
        let location = match location {
            Some(l) if !l.is_empty() => l,
            _ => return Err(TrackError::MissingInput),
        };
        let endpoint = self.endpoint(request_base)?;
        let matched_site_id = self.cache.get_or_compute(location)?;

        Ok(TrackingResult {
            catch_all_site_id: self.cache.catch_all(),
            matched_site_id,
            endpoint,
        })
    }
}
