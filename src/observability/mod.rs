//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! tracking handler, resolution cache, registry watcher
//!     → logging.rs (tracing events on stdout, filtered by RUST_LOG)
//!     → metrics.rs (request, cache and resolution counters)
//!     → Prometheus exporter on observability.metrics_address
//! ```
//!
//! # Design Decisions
//! - Events carry location, site_id and request_id as fields
//! - Recording a metric without an installed exporter is a no-op

pub mod logging;
pub mod metrics;
