//! Site registry subsystem.
//!
//! # Data Flow
//! ```text
//! Registry source (file or memory)
//!     → primary URLs  (one per site)
//!     → secondary URLs (many per site)
//!     → query_candidates: exclude catch-all, keep URLs contained in location,
//!       union + de-duplicate, order by URL length descending
//!     → Vec<SiteUrl> handed to the matcher
//! ```
//!
//! # Design Decisions
//! - Reads are synchronous; a miss in the resolution cache pays one read
//! - Every source carries a generation counter, bumped on change
//! - Read failures are errors, never an empty candidate set

pub mod file;
pub mod memory;
pub mod types;

use std::collections::HashSet;

pub use file::FileRegistry;
pub use memory::MemoryRegistry;
pub use types::{RegistryError, RegistryResult, SiteId, SiteRecord, SiteUrl, UrlOrigin};

/// A source of registered site URLs.
pub trait SiteRegistry: Send + Sync + std::fmt::Debug {
    /// Return every (site, url) pair whose URL is contained in `location`,
    /// excluding `exclude`, de-duplicated and longest URL first.
    fn candidates(&self, location: &str, exclude: SiteId) -> RegistryResult<Vec<SiteUrl>>;

    /// Current generation of the registry content.
    fn generation(&self) -> u64;
}

/// Build the candidate set for `location` out of a list of site records.
///
/// Mirrors the registry query: the union of distinct primary and distinct
/// secondary URLs, both filtered by containment and the excluded id, ordered
/// by URL length descending, then site id ascending.
pub fn query_candidates<'a, I>(sites: I, location: &str, exclude: SiteId) -> Vec<SiteUrl>
where
    I: IntoIterator<Item = &'a SiteRecord>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for site in sites {
        if site.id == exclude {
            continue;
        }
        let primary = site.main_url.iter().map(|u| (u, UrlOrigin::Primary));
        let secondary = site.urls.iter().map(|u| (u, UrlOrigin::Secondary));

        for (url, origin) in primary.chain(secondary) {
            if url.is_empty() || !location.contains(url.as_str()) {
                continue;
            }
            // UNION DISTINCT over (site, url): a URL listed in both tables counts once.
            if seen.insert((site.id, url.as_str())) {
                out.push(SiteUrl { site_id: site.id, url: url.clone(), origin });
            }
        }
    }

    out.sort_by(|a, b| {
        b.url
            .len()
            .cmp(&a.url.len())
            .then(a.site_id.cmp(&b.site_id))
            .then_with(|| a.url.cmp(&b.url))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(id: SiteId, main_url: Option<&str>, urls: &[&str]) -> SiteRecord {
        SiteRecord {
            id,
            main_url: main_url.map(str::to_string),
            urls: urls.iter().map(|u| u.to_string()).collect(),
        }
    }

    #[test]
    fn test_union_is_distinct_and_ordered() {
        let sites = vec![
            site(1, Some("example.com/a"), &["example.com/a", "example.com"]),
            site(2, None, &["example.com/a/b"]),
            site(3, Some("other.org"), &[]),
        ];

        let found = query_candidates(&sites, "https://example.com/a/b/page", 358);
        let pairs: Vec<_> = found.iter().map(|c| (c.site_id, c.url.as_str())).collect();
        assert_eq!(
            pairs,
            vec![(2, "example.com/a/b"), (1, "example.com/a"), (1, "example.com")]
        );
        assert_eq!(found[1].origin, UrlOrigin::Primary);
    }

    #[test]
    fn test_excluded_site_is_dropped() {
        let sites = vec![site(358, Some("example.com"), &[]), site(4, None, &["example"])];
        let found = query_candidates(&sites, "https://example.com", 358);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].site_id, 4);
    }

    #[test]
    fn test_empty_urls_never_match() {
        let sites = vec![site(5, Some(""), &[""])];
        assert!(query_candidates(&sites, "https://example.com", 358).is_empty());
    }

    #[test]
    fn test_containment_is_case_sensitive() {
        let sites = vec![site(6, Some("Example.com"), &[])];
        assert!(query_candidates(&sites, "https://example.com", 358).is_empty());
    }
}
