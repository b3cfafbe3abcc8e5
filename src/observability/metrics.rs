//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Count entries per stream and severity
//! - Count closed groups by their computed severity
//! - Count delivery failures by kind
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `grouplog_entries_total` (counter): entries submitted, by stream and severity
//! - `grouplog_groups_closed_total` (counter): outer entries emitted, by severity
//! - `grouplog_delivery_errors_total` (counter): failed submissions or writes, by kind
//!
//! # Design Decisions
//! - Updates go through the `metrics` facade; without an installed recorder they are no-ops
//! - Label values are static strings, so recording never allocates

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::entry::Severity;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_entry(stream: &'static str, severity: Severity) {
    metrics::counter!(
        "grouplog_entries_total",
        "stream" => stream,
        "severity" => severity.as_str()
    )
    .increment(1);
}

pub fn record_group_closed(severity: Severity) {
    metrics::counter!("grouplog_groups_closed_total", "severity" => severity.as_str()).increment(1);
}

pub fn record_delivery_error(kind: &'static str) {
    metrics::counter!("grouplog_delivery_errors_total", "kind" => kind).increment(1);
}
