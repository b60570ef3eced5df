//! # Domain Catalog Service


use crate::domain::{ApexZone, DomainEntry};
use crate::ports::outbound::DomainStore;
use shared_types::{CallContext, StorageError, Timestamp};
use std::sync::Arc;
use tracing::{debug, info};

/// Deduplicated catalog of apex zones.
pub struct DomainCatalog {
    store: Arc<dyn DomainStore>,
}

impl DomainCatalog {
    pub fn new(store: Arc<dyn DomainStore>) -> Self {
        Self { store }
    }

    /// Admit `zone` if it has never been seen.
    ///
    /// Returns `true` when this call created the entry.
    pub async fn insert_if_absent(
        &self,
        ctx: &CallContext,
        zone: &ApexZone,
        now: Timestamp,
    ) -> Result<bool, StorageError> {
        let inserted = self.store.insert_if_absent(ctx, zone, now).await?;
        if inserted {
            info!(apex_zone = %zone, "Admitted new apex zone");
        } else {
            debug!(apex_zone = %zone, "Apex zone already cataloged");
        }
        Ok(inserted)
    }

    pub async fn find(
        &self,
        ctx: &CallContext,
        zone: &ApexZone,
    ) -> Result<Option<DomainEntry>, StorageError> {
        self.store.find(ctx, zone).await
    }

    pub async fn count(&self, ctx: &CallContext) -> Result<u64, StorageError> {
        self.store.count(ctx).await
    }
}
