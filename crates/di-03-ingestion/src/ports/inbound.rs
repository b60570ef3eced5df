//! # Inbound Port - IngestApi
//!
//! Driving port used by the transport router.

use crate::domain::Outcome;
use async_trait::async_trait;
use shared_types::{CallContext, Identity, Timestamp};

/// Submit one message for ingestion.
///
/// # Example
///
/// ```rust,ignore
/// use di_03_ingestion::{IngestApi, Outcome};
///
/// async fn handle(api: &dyn IngestApi, ctx: &CallContext, who: &Identity, text: &str) {
///     if let Outcome::Admitted(zone) = api.ingest(ctx, who, text, chrono::Utc::now()).await {
///         println!("`{zone}`");
///     }
/// }
/// ```
#[async_trait]
pub trait IngestApi: Send + Sync {
    /// Never fails: storage errors come back as [`Outcome::Failed`].
    async fn ingest(
        &self,
        ctx: &CallContext,
        identity: &Identity,
        raw_message: &str,
        now: Timestamp,
    ) -> Outcome;
}
