//! Metrics collection and exposition.
//!
//! # Metrics
//! - `search_queries_total` (counter): queries by strategy, verdict
//! - `search_query_duration_seconds` (histogram): lookup latency by strategy
//! - `search_lookup_errors_total` (counter): failed streaming lookups
//! - `search_active_sessions` (gauge): current connection count
//! - `search_sessions_closed_total` (counter): closed sessions by reason
//! - `search_tls_handshake_failures_total` (counter)
//! - `search_corpus_lines` (gauge): distinct lines in the cached snapshot
//! - `search_corpus_reloads_total` (counter): snapshot rebuilds by result
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op, so tests need no setup
//! - Labels are static strings only

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_query(strategy: &'static str, verdict: &'static str, latency: Duration) {
    ::metrics::counter!("search_queries_total", "strategy" => strategy, "verdict" => verdict)
        .increment(1);
    ::metrics::histogram!("search_query_duration_seconds", "strategy" => strategy)
        .record(latency.as_secs_f64());
}

pub fn record_lookup_error() {
    ::metrics::counter!("search_lookup_errors_total").increment(1);
}

pub fn record_session_opened() {
    ::metrics::gauge!("search_active_sessions").increment(1.0);
}

pub fn record_session_ended() {
    ::metrics::gauge!("search_active_sessions").decrement(1.0);
}

pub fn record_session_closed(reason: &'static str) {
    ::metrics::counter!("search_sessions_closed_total", "reason" => reason).increment(1);
}

pub fn record_handshake_failure() {
    ::metrics::counter!("search_tls_handshake_failures_total").increment(1);
}

pub fn record_corpus_size(lines: usize) {
    ::metrics::gauge!("search_corpus_lines").set(lines as f64);
}

pub fn record_corpus_reload(success: bool, lines: usize) {
    let result = if success { "success" } else { "failure" };
    ::metrics::counter!("search_corpus_reloads_total", "result" => result).increment(1);
    record_corpus_size(lines);
}
