//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define scoring metrics (requests, latency, failures, timeouts, in-flight)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `scoring_requests_total` (counter): requests by status
//! - `scoring_request_duration_seconds` (histogram): end-to-end latency
//! - `scoring_failures_total` (counter): classified failures by kind
//! - `scoring_timeouts_total` (counter): deadlines that fired
//! - `scoring_invocations_in_flight` (gauge): invocations between hook start and stop
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(status: u16, start_time: Instant) {
    metrics::counter!("scoring_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("scoring_request_duration_seconds").record(start_time.elapsed().as_secs_f64());
}

pub fn record_failure(kind: &'static str) {
    metrics::counter!("scoring_failures_total", "kind" => kind).increment(1);
}

pub fn record_timeout() {
    metrics::counter!("scoring_timeouts_total").increment(1);
}

pub fn invocation_started() {
    metrics::gauge!("scoring_invocations_in_flight").increment(1.0);
}

pub fn invocation_finished() {
    metrics::gauge!("scoring_invocations_in_flight").decrement(1.0);
}
