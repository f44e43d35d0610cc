//! Site tracker library.
//!
//! Resolves which registered site a page URL belongs to and renders the
//! analytics tracking snippet for it.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod resolver;
pub mod snippet;
pub mod tracking;

pub use config::schema::TrackerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resolver::ResolutionCache;
pub use tracking::{TrackError, TrackingResult, TrackingService};
