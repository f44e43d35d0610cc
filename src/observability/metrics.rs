//! Metrics collection and exposition.
//!
//! # Metrics
//! - `tracker_requests_total` (counter): snippet requests by status
//! - `tracker_request_duration_seconds` (histogram): latency distribution
//! - `tracker_cache_lookups_total` (counter): hits and misses
//! - `tracker_cache_errors_total` (counter): backend failures by operation
//! - `tracker_resolutions_total` (counter): matched, unmatched, failed
//! - `tracker_cache_entries` (gauge): locations held in the map

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(status: u16, start: Instant) {
    counter!("tracker_requests_total", "status" => status.to_string()).increment(1);
    histogram!("tracker_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("tracker_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_cache_error(op: &'static str) {
    counter!("tracker_cache_errors_total", "op" => op).increment(1);
}

pub fn record_resolution(outcome: &'static str) {
    counter!("tracker_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn record_cache_entries(entries: usize) {
    gauge!("tracker_cache_entries").set(entries as f64);
}
