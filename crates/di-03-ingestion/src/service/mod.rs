//! # Ingestion Service

#[cfg(test)]
mod tests;

use crate::domain::{IngestError, Outcome};
use crate::ports::{IngestApi, ZoneExtractor};
use async_trait::async_trait;
use di_01_rate_limiter::RateLimiter;
use di_02_domain_catalog::{extract_apex_zone, DomainCatalog};
use shared_types::{CallContext, Identity, Timestamp};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Storage error metric label for an attempt that could not be recorded.
/// The decision still stands, so this never becomes a `Failed` outcome.
pub const RECORD_FAILURE_STAGE: &str = "rate_limit_record";

/// Rate limit, extract, then deduplicate.
pub struct IngestionPipeline {
    limiter: Arc<RateLimiter>,
    catalog: Arc<DomainCatalog>,
    extractor: Arc<dyn ZoneExtractor>,
}

impl IngestionPipeline {
    /// Build a pipeline with the default extraction heuristic.
    pub fn new(limiter: Arc<RateLimiter>, catalog: Arc<DomainCatalog>) -> Self {
        Self {
            limiter,
            catalog,
            extractor: Arc::new(extract_apex_zone),
        }
    }

    /// Replace the extraction heuristic.
    pub fn with_extractor(mut self, extractor: Arc<dyn ZoneExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn catalog(&self) -> &Arc<DomainCatalog> {
        &self.catalog
    }

    #[instrument(name = "ingest", skip_all, fields(identity = %identity))]
    pub async fn ingest(
        &self,
        ctx: &CallContext,
        identity: &Identity,
        raw_message: &str,
        now: Timestamp,
    ) -> Outcome {
        let decision = match self.limiter.can_pass(ctx, identity, now).await {
            Ok(decision) => decision,
            Err(err) => return failed(IngestError::rate_limit(err)),
        };
        if decision.record_failure.is_some() {
            intake_telemetry::record_storage_error(RECORD_FAILURE_STAGE);
        }
        if !decision.is_allowed() {
            debug!(
                attempts_in_window = decision.attempts_in_window,
                "Rate limited"
            );
            return Outcome::RateLimited;
        }

        let zone = match self.extractor.extract(raw_message) {
            Ok(zone) => zone,
            Err(reason) => {
                debug!(reason = %reason, "Malformed submission");
                return Outcome::Malformed(reason);
            }
        };

        match self.catalog.insert_if_absent(ctx, &zone, now).await {
            Ok(true) => Outcome::Admitted(zone),
            Ok(false) => Outcome::Duplicate(zone),
            Err(err) => failed(IngestError::catalog(err)),
        }
    }
}

fn failed(err: IngestError) -> Outcome {
    warn!(stage = %err.stage, error = %err.source, "Ingestion failed");
    Outcome::Failed(err)
}

#[async_trait]
impl IngestApi for IngestionPipeline {
    async fn ingest(
        &self,
        ctx: &CallContext,
        identity: &Identity,
        raw_message: &str,
        now: Timestamp,
    ) -> Outcome {
        IngestionPipeline::ingest(self, ctx, identity, raw_message, now).await
    }
}
