//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): requests by method, outcome, status
//! - `dispatch_request_duration_seconds` (histogram): latency distribution
//! - `dispatch_in_flight` (gauge): connections currently being served
//! - `dispatch_routes_registered` (gauge): size of the route table
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

pub fn record_request(method: &str, outcome: &'static str, status: u16, start: Instant) {
    counter!(
        "dispatch_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("dispatch_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_in_flight(count: u64) {
    gauge!("dispatch_in_flight").set(count as f64);
}

pub fn record_routes_registered(count: usize) {
    gauge!("dispatch_routes_registered").set(count as f64);
}
