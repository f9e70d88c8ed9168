//! Metrics collection and exposition.
//!
//! # Metrics
//! - `graphql_queries_total` (counter): executed GraphQL requests
//! - `graphql_query_duration_seconds` (histogram): request latency
//!
//! Without an installed recorder the macros are no-ops, so tests and
//! metrics-disabled deployments pay nothing.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

pub const QUERIES_TOTAL: &str = "graphql_queries_total";
pub const QUERY_DURATION_SECONDS: &str = "graphql_query_duration_seconds";

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            metrics::describe_counter!(QUERIES_TOTAL, "Executed GraphQL requests");
            metrics::describe_histogram!(
                QUERY_DURATION_SECONDS,
                metrics::Unit::Seconds,
                "GraphQL request latency"
            );
            tracing::info!(address = %addr, "Metrics endpoint listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Record one finished GraphQL request.
pub fn record_query(elapsed: Duration) {
    metrics::counter!(QUERIES_TOTAL).increment(1);
    metrics::histogram!(QUERY_DURATION_SECONDS).record(elapsed.as_secs_f64());
}
