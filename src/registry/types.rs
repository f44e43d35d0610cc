//! Site registry types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Site (tenant) identifier.
pub type SiteId = u32;

/// Which registry table a URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlOrigin {
    /// The site's main URL (at most one per site).
    Primary,
    /// One of the site's additional URLs.
    Secondary,
}

/// A registered URL of a site, as seen by the matcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteUrl {
    pub site_id: SiteId,
    pub url: String,
    pub origin: UrlOrigin,
}

impl SiteUrl {
    pub fn primary(site_id: SiteId, url: impl Into<String>) -> Self {
        Self { site_id, url: url.into(), origin: UrlOrigin::Primary }
    }

    pub fn secondary(site_id: SiteId, url: impl Into<String>) -> Self {
        Self { site_id, url: url.into(), origin: UrlOrigin::Secondary }
    }
}

/// One site as stored in the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    /// Unique site id.
    pub id: SiteId,
    /// Main URL of the site.
    #[serde(default)]
    pub main_url: Option<String>,
    /// Additional URLs of the site.
    #[serde(default)]
    pub urls: Vec<String>,
}

/// Errors that can occur while reading the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The backing source could not be read.
    #[error("registry unavailable: {0}")]
    Unavailable(String),

    /// The backing source was read but its content is malformed.
    #[error("registry parse error: {0}")]
    Parse(String),

    /// Two records share the same site id.
    #[error("duplicate site id {0}")]
    DuplicateSite(SiteId),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
