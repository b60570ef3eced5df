//! # Outbound Ports (Driven Ports)
//!
//! Production: `SqliteStore` (intake-runtime/adapters/storage/sqlite_adapter.rs)
//! Testing: `InMemoryDomainStore` (crate::adapters)

use crate::domain::{ApexZone, DomainEntry};
use async_trait::async_trait;
use shared_types::{CallContext, StorageError, Timestamp};

/// Durable set of admitted zones keyed by the normalized zone string.
#[async_trait]
pub trait DomainStore: Send + Sync {
    /// Insert `zone` unless it already exists.
    ///
    /// ## Atomicity Guarantee
    ///
    /// Must be a single conditional insert enforced by the storage engine.
    /// Returns `Ok(true)` if this call created the row, `Ok(false)` if the
    /// zone was already present. Errors are reserved for genuine storage
    /// failures.
    async fn insert_if_absent(
        &self,
        ctx: &CallContext,
        zone: &ApexZone,
        now: Timestamp,
    ) -> Result<bool, StorageError>;

    /// Look up a single entry.
    async fn find(
        &self,
        ctx: &CallContext,
        zone: &ApexZone,
    ) -> Result<Option<DomainEntry>, StorageError>;

    /// Number of admitted zones.
    async fn count(&self, ctx: &CallContext) -> Result<u64, StorageError>;
}
