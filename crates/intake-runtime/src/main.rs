//! # Domain Intake Service
//!
//! Reads submissions as JSON lines on stdin and writes replies and operator
//! alerts as JSON lines on stdout. Logs go to stderr.
//!
//! ## Lifecycle
//!
//! 1. `.env` file, if present; variables already set win
//! 2. Telemetry (`DI_LOG_LEVEL`, `DI_JSON_LOGS`)
//! 3. Configuration from the environment, validated
//! 4. Database open + migrations
//! 5. Prune sweep and transport loop
//! 6. Ctrl+C or EOF: stop reading, drain in-flight messages, stop the sweep
//! 7. A second Ctrl+C cancels in-flight storage calls

use std::sync::Arc;

use anyhow::{Context, Result};
use intake_runtime::container::load_dotenv;
use intake_runtime::{serve, IntakeContainer, RuntimeConfig};
use intake_telemetry::TelemetryConfig;
use tokio::io::BufReader;
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = load_dotenv().context("Failed to load .env")?;
    intake_telemetry::init_telemetry(&TelemetryConfig::from_env())
        .context("Failed to initialize telemetry")?;
    if let Some(path) = env_file {
        info!(path = %path.display(), "Loaded environment file");
    }

    let config = RuntimeConfig::from_env().context("Failed to load configuration")?;
    let container = IntakeContainer::open(config)
        .await
        .context("Failed to start intake services")?;

    info!("===========================================");
    info!("  Domain Intake v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);
    let (abort_tx, abort_rx) = watch::channel(false);

    let sweep_handle = container
        .prune_sweep()
        .map(|sweep| tokio::spawn(sweep.run(shutdown_rx.clone())));
    if sweep_handle.is_none() {
        info!("Prune sweep disabled");
    }

    let signal_shutdown = Arc::clone(&shutdown_tx);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        info!("Interrupt received; finishing in-flight messages");
        let _ = signal_shutdown.send(true);

        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Second interrupt; cancelling in-flight storage calls");
            let _ = abort_tx.send(true);
        }
    });

    let router = Arc::new(container.router().with_cancel(abort_rx));
    let stdin = BufReader::new(tokio::io::stdin());
    let max_in_flight = container.config.max_in_flight;
    let (summary, _stdout) = serve(
        router,
        stdin,
        tokio::io::stdout(),
        shutdown_rx,
        max_in_flight,
    )
    .await
    .context("Transport failed")?;

    info!(
        routed = summary.routed,
        rejected = summary.rejected,
        written = summary.written,
        peak_in_flight = summary.peak_in_flight,
        "Transport closed"
    );

    let _ = shutdown_tx.send(true);
    if let Some(handle) = sweep_handle {
        if let Err(err) = handle.await {
            warn!(error = %err, "Prune sweep task failed");
        }
    }

    match intake_telemetry::encode_metrics() {
        Ok(snapshot) => info!(metrics = %snapshot, "Final metrics snapshot"),
        Err(err) => warn!(error = %err, "Failed to encode metrics"),
    }
    info!("Shutdown complete");
    Ok(())
}
