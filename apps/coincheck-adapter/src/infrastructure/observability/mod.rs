//! Observability: structured logging and Prometheus counters.

mod metrics;
mod tracing;

pub use self::metrics::{
    MetricsConfig, MetricsError, init_metrics, record_failure_absorbed, record_malformed_payload,
    record_retries_exhausted,
    record_retry_scheduled, record_venue_call,
};
pub use self::tracing::{TracingError, init_tracing};
