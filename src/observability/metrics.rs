//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by method, status
//! - `relay_request_duration_seconds` (histogram): end-to-end latency
//! - `relay_upstream_errors_total` (counter): unreachable / timeout
//! - `relay_cookies_reissued_total` (counter): cookies written, by mode
//! - `relay_cookies_skipped_total` (counter): cookies dropped, by reason

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::cookies::EnvironmentMode;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    metrics::counter!(
        "relay_requests_total",
        "method" => method.to_string(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!("relay_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_error(kind: &'static str) {
    metrics::counter!("relay_upstream_errors_total", "kind" => kind).increment(1);
}

pub fn record_cookie_reissued(mode: EnvironmentMode) {
    metrics::counter!("relay_cookies_reissued_total", "mode" => mode.as_str()).increment(1);
}

pub fn record_cookie_skipped(reason: &'static str) {
    metrics::counter!("relay_cookies_skipped_total", "reason" => reason).increment(1);
}
