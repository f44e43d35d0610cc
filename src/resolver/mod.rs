//! Site resolution subsystem.
//!
//! # Data Flow
//! ```text
//! location
//!     → cache.rs (location map lookup)
//!     → on miss: registry candidates → matcher.rs (longest substring)
//!     → store.rs (re-store whole map with fresh TTL)
//!     → Option<SiteId>
//! ```
//!
//! # Design Decisions
//! - Synchronous: resolution never suspends
//! - "No site matched" and "could not resolve" are different results

pub mod cache;
pub mod matcher;
pub mod store;

use thiserror::Error;

use crate::registry::RegistryError;

pub use cache::{CachePolicy, CacheStats, ResolutionCache, LOCATION_MAP_KEY};
pub use matcher::SiteMatcher;
pub use store::{CacheError, CacheStore, LocationMap, MemoryCacheStore};

/// Errors that stop a location from being resolved.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The site registry could not be read.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result type for resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;
