//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_requests_total` (counter): requests by outcome and status
//! - `edge_request_duration_seconds` (histogram): latency by outcome
//! - `edge_rule_hits_total` (counter): which access rule fired
//! - `edge_config_reloads_total` (counter): reload attempts by result
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(outcome: &'static str, status: u16, start: Instant) {
    counter!(
        "edge_requests_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("edge_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rule_hit(rule: &'static str) {
    counter!("edge_rule_hits_total", "rule" => rule).increment(1);
}

pub fn record_config_reload(success: bool) {
    let result = if success { "ok" } else { "error" };
    counter!("edge_config_reloads_total", "result" => result).increment(1);
}
