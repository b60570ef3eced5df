//! # Intake Telemetry
//!
//! Structured logging and Prometheus counters for the domain intake service.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use intake_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // Logs go to stderr, counters accumulate in the global registry.
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DI_LOG_LEVEL` or `RUST_LOG` | `info` | Log filter directive |
//! | `DI_JSON_LOGS` | `false` | Emit JSON lines instead of human-readable logs |
//! | `DI_SERVICE_NAME` | `domain-intake` | Service name attached to the startup log |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{encode_metrics, record_outcome, record_storage_error, register_metrics};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{directive}': {message}")]
    Filter { directive: String, message: String },

    #[error("Failed to install log subscriber: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Register metrics, then install the log subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)?;

    tracing::info!(
        service = %config.service_name,
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );
    Ok(())
}
