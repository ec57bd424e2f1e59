//! Metrics collection and exposition.
//!
//! # Metrics
//! - `unwrapper_requests_total` (counter): inbound requests by status
//! - `unwrapper_request_duration_seconds` (histogram): end-to-end resolution time
//! - `unwrapper_hops_total` (counter): successful single-hop probes
//! - `unwrapper_chain_errors_total` (counter): failed resolutions by error kind
//! - `unwrapper_query_params_stripped_total` (counter): tracking params removed
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

/// Record a completed inbound request.
pub fn record_request(status: u16, start: Instant) {
    counter!("unwrapper_requests_total", "status" => status.to_string()).increment(1);
    histogram!("unwrapper_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record one successful probe for a redirector host.
pub fn record_hop(host: &str) {
    counter!("unwrapper_hops_total", "host" => host.to_string()).increment(1);
}

/// Record a resolution that ended in an error.
pub fn record_chain_error(kind: &'static str) {
    counter!("unwrapper_chain_errors_total", "kind" => kind).increment(1);
}

/// Record tracking parameters removed by the sanitizer.
pub fn record_params_stripped(count: u64) {
    counter!("unwrapper_query_params_stripped_total").increment(count);
}
