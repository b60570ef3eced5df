//! # Outbound Ports (Driven Ports)
//!
//! Durable append log of attempts.
//!
//! Production: `SqliteStore` (intake-runtime/adapters/storage/sqlite_adapter.rs)
//! Testing: `InMemoryAttemptLedger` (crate::adapters)

use async_trait::async_trait;
use shared_types::{CallContext, Identity, StorageError, Timestamp};

/// Append-only record of "an identity attempted an action at time T".
///
/// Implementations must not keep a cached copy of counts: every call reads
/// or writes durable state. Every call honours the context's deadline and
/// cancellation.
#[async_trait]
pub trait AttemptLedger: Send + Sync {
    /// Append one attempt row.
    async fn record_attempt(
        &self,
        ctx: &CallContext,
        identity: &Identity,
        now: Timestamp,
    ) -> Result<(), StorageError>;

    /// Count attempts for `identity` with `occurred_at >= since`.
    async fn count_attempts(
        &self,
        ctx: &CallContext,
        identity: &Identity,
        since: Timestamp,
    ) -> Result<u64, StorageError>;

    /// Maintenance sweep: delete attempts with `occurred_at < cutoff`.
    ///
    /// Returns the number of rows removed. Not part of the admission path.
    async fn prune_before(&self, ctx: &CallContext, cutoff: Timestamp)
        -> Result<u64, StorageError>;
}
