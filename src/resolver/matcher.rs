//! Longest-substring site matching.
//!
//! # Design Decisions
//! - Containment is plain `str::contains`: unanchored, case-sensitive, byte exact
//! - Longest URL wins; equal lengths fall back to the lowest site id
//! - The catch-all site is never a match target
//! - Empty URLs are ignored, they would otherwise match every location

use crate::registry::{SiteId, SiteUrl};

/// Picks the best-matching site for a location.
#[derive(Debug, Clone, Copy)]
pub struct SiteMatcher {
    catch_all: SiteId,
}

impl SiteMatcher {
    /// Create a matcher that never returns `catch_all`.
    pub fn new(catch_all: SiteId) -> Self {
        Self { catch_all }
    }

    /// The excluded catch-all site id.
    pub fn catch_all(&self) -> SiteId {
        self.catch_all
    }

    /// Return the site whose URL is the longest substring of `location`.
    pub fn resolve(&self, location: &str, candidates: &[SiteUrl]) -> Option<SiteId> {
        if location.is_empty() {
            return None;
        }

        candidates
            .iter()
            .filter(|c| c.site_id != self.catch_all)
            .filter(|c| !c.url.is_empty() && location.contains(c.url.as_str()))
            .min_by(|a, b| {
                b.url
                    .len()
                    .cmp(&a.url.len())
                    .then(a.site_id.cmp(&b.site_id))
            })
            .map(|c| c.site_id)
    }
}
