//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → TrackerConfig (validated, immutable)
//!     → lifecycle/startup.rs builds the service from it
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → sent to the HTTP server, which swaps the snippet settings
//!     → new settings apply to the next request
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Listener and registry changes need a restart

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, CacheConfig, ListenerConfig, ObservabilityConfig, RegistryConfig,
    SnippetConfig, TimeoutConfig, TrackerConfig, SITE_ALL,
};
pub use watcher::{watch_file, ConfigWatcher};
