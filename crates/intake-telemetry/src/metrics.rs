//! Prometheus metrics for the intake service.
//!
//! All metrics follow the naming convention: `di_<area>_<metric>_total`

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Ingestion outcomes by kind (admitted, duplicate, rate_limited, malformed, failed)
    pub static ref INGEST_OUTCOMES: CounterVec = CounterVec::new(
        Opts::new("di_ingest_outcomes_total", "Ingestion calls by terminal outcome"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Storage failures by pipeline stage (rate_limit, rate_limit_record, catalog, sweep)
    pub static ref STORAGE_ERRORS: CounterVec = CounterVec::new(
        Opts::new("di_storage_errors_total", "Storage failures by pipeline stage"),
        &["stage"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry. Safe to call twice.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(INGEST_OUTCOMES.clone()),
        Box::new(STORAGE_ERRORS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

pub fn record_outcome(outcome: &str) {
    INGEST_OUTCOMES.with_label_values(&[outcome]).inc();
}

pub fn record_storage_error(stage: &str) {
    STORAGE_ERRORS.with_label_values(&[stage]).inc();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
