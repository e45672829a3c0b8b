//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gtr_requests_total` (counter): requests by endpoint, status
//! - `gtr_transload_duration_seconds` (histogram): transload latency by status
//! - `gtr_transload_bytes_total` (counter): source bytes streamed to destinations
//! - `gtr_source_rejections_total` (counter): copy sources refused by the allowlist
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count a finished request.
pub fn record_request(endpoint: &'static str, status: u16) {
    counter!("gtr_requests_total", "endpoint" => endpoint, "status" => status.to_string())
        .increment(1);
}

/// Record the duration of a transload.
pub fn record_transload(status: u16, start: Instant) {
    histogram!("gtr_transload_duration_seconds", "status" => status.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Count bytes piped from a source into a destination write.
pub fn record_streamed_bytes(bytes: usize) {
    counter!("gtr_transload_bytes_total").increment(bytes as u64);
}

/// Count a copy source refused by the allowlist.
pub fn record_source_rejection() {
    counter!("gtr_source_rejections_total").increment(1);
}
