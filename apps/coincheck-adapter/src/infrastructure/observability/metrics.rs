//! Prometheus metrics for the adapter.
//!
//! Every venue call is counted by operation and outcome, and each failure
//! path of the policy table has its own counter. Recording is a no-op until
//! an exporter is installed.

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

use crate::application::{FailurePolicy, Operation};

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
}

impl MetricsConfig {
    /// Create a metrics configuration for an address.
    #[must_use]
    pub const fn with_addr(listen_addr: SocketAddr) -> Self {
        Self { listen_addr }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// Starts an HTTP listener that exposes metrics at `/metrics`. Must be
/// called from within a tokio runtime.
///
/// # Errors
///
/// Returns an error if the exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

/// Record the outcome of one venue call.
///
/// # Arguments
///
/// * `operation` - Gateway operation that issued the call
/// * `outcome` - `"success"`, `"failure"` or `"malformed"`
pub fn record_venue_call(operation: Operation, outcome: &'static str) {
    counter!(
        "venue_calls_total",
        "operation" => operation.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a re-dispatch scheduled by the retry scheduler.
pub fn record_retry_scheduled(operation: Operation) {
    counter!("venue_retries_scheduled_total", "operation" => operation.as_str()).increment(1);
}

/// Record an operation that gave up at the attempt cap.
pub fn record_retries_exhausted(operation: Operation) {
    counter!("venue_retries_exhausted_total", "operation" => operation.as_str()).increment(1);
}

/// Record a failure reported to the caller as a neutral result.
pub fn record_failure_absorbed(operation: Operation) {
    counter!("venue_failures_absorbed_total", "operation" => operation.as_str()).increment(1);
}

/// Record a venue payload that did not translate.
///
/// An operation that absorbs its failures reports the malformed payload as a
/// neutral result, so it is counted as absorbed too.
pub fn record_malformed_payload(operation: Operation) {
    record_venue_call(operation, "malformed");
    if operation.failure_policy() == FailurePolicy::Absorb {
        record_failure_absorbed(operation);
    }
}
