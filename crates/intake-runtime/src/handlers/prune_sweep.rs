//! # Attempt Prune Sweep
//!
//! Periodically deletes attempts older than the rate-limit window. Rows
//! outside every possible window never affect a decision, so pruning them
//! only bounds table growth.

use chrono::Utc;
use di_01_rate_limiter::RateLimiter;
use shared_types::{CallContext, StorageError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub struct PruneSweep {
    limiter: Arc<RateLimiter>,
    interval: Duration,
    op_timeout: Duration,
}

impl PruneSweep {
    pub fn new(limiter: Arc<RateLimiter>, interval: Duration, op_timeout: Duration) -> Self {
        Self {
            limiter,
            interval,
            op_timeout,
        }
    }

    /// Prune once. Returns the number of rows removed.
    pub async fn sweep_once(&self) -> Result<u64, StorageError> {
        let ctx = CallContext::with_timeout(self.op_timeout);
        match self.limiter.prune_expired(&ctx, Utc::now()).await {
            Ok(0) => {
                debug!("Prune sweep found nothing to remove");
                Ok(0)
            }
            Ok(removed) => {
                info!(removed, "Pruned expired attempts");
                Ok(removed)
            }
            Err(err) => {
                intake_telemetry::record_storage_error("sweep");
                warn!(error = %err, "Prune sweep failed");
                Err(err)
            }
        }
    }

    /// Sweep every `interval` until `shutdown` fires. The first sweep runs
    /// immediately.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Prune sweep stopped");
                        return;
                    }
                }
                _ = ticker.tick() => {
                    let _ = self.sweep_once().await;
                }
            }
        }
    }
}
