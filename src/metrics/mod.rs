//! Prometheus metrics for monitoring
//!
//! Exposes metrics for:
//! - Reconciliation outcomes and latency
//! - External call failures by collaborator

use crate::status::Outcome;

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

lazy_static! {
    pub static ref RECONCILIATIONS: CounterVec = register_counter_vec!(
        "swap_status_reconciliations_total",
        "Total status reconciliations by terminal outcome",
        &["outcome"]
    ).unwrap();

    pub static ref RECONCILIATION_LATENCY: HistogramVec = register_histogram_vec!(
        "swap_status_reconciliation_latency_seconds",
        "End-to-end reconciliation latency",
        &["outcome"],
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).unwrap();

    pub static ref EXTERNAL_FAILURES: CounterVec = register_counter_vec!(
        "swap_status_external_failures_total",
        "Failed calls to the order store, log search and matching engine",
        &["collaborator", "kind"]
    ).unwrap();

    pub static ref TOOL_CALLS: CounterVec = register_counter_vec!(
        "swap_status_tool_calls_total",
        "Tool server requests by method",
        &["method"]
    ).unwrap();
}

/// Prometheus text exposition of the default registry
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

// Helper functions to record metrics

pub fn record_reconciliation(outcome: Outcome, latency_secs: f64) {
    RECONCILIATIONS
        .with_label_values(&[outcome.as_str()])
        .inc();
    RECONCILIATION_LATENCY
        .with_label_values(&[outcome.as_str()])
        .observe(latency_secs);
}

pub fn record_external_failure(collaborator: &str, kind: &str) {
    EXTERNAL_FAILURES
        .with_label_values(&[collaborator, kind])
        .inc();
}

pub fn record_tool_call(method: &str) {
    TOOL_CALLS.with_label_values(&[method]).inc();
}
