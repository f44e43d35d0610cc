//! File-backed site registry.
//!
//! The registry is a TOML document listing sites:
//!
//! ```toml
//! [[sites]]
//! id = 1
//! main_url = "example.com/a"
//! urls = ["www.example.com/a"]
//! ```
//!
//! The file is re-read on every query, so an edit is visible to the next
//! cache miss. A watcher bumps the generation when the file changes.

use notify::RecommendedWatcher;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::watcher::watch_file;
use crate::registry::types::{RegistryError, RegistryResult, SiteId, SiteRecord, SiteUrl};
use crate::registry::{query_candidates, SiteRegistry};

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    sites: Vec<SiteRecord>,
}

/// Registry reading sites from a TOML file.
#[derive(Debug, Clone)]
pub struct FileRegistry {
    path: PathBuf,
    generation: Arc<AtomicU64>,
}

impl FileRegistry {
    /// Create a registry backed by `path`. The file is not read until queried.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse every site from the file.
    pub fn load(&self) -> RegistryResult<Vec<SiteRecord>> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            RegistryError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;
        let file: RegistryFile =
            toml::from_str(&content).map_err(|e| RegistryError::Parse(e.to_string()))?;

        let mut ids = HashSet::new();
        for site in &file.sites {
            if !ids.insert(site.id) {
                return Err(RegistryError::DuplicateSite(site.id));
            }
        }
        Ok(file.sites)
    }

    /// Mark the registry as changed.
    pub fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Watch the backing file and bump the generation on every change,
    /// including a new file renamed over it.
    ///
    /// The returned handle must be kept alive for as long as watching is wanted.
    pub fn watch(&self) -> Result<RecommendedWatcher, notify::Error> {
        let generation = self.generation.clone();
        let watcher = watch_file(&self.path, move |_| {
            let current = generation.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::info!(generation = current, "Registry file changed");
        })?;

        tracing::info!(path = ?self.path, "Registry watcher started");
        Ok(watcher)
    }
}

impl SiteRegistry for FileRegistry {
    fn candidates(&self, location: &str, exclude: SiteId) -> RegistryResult<Vec<SiteUrl>> {
        let sites = self.load()?;
        Ok(query_candidates(&sites, location, exclude))
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
