//! In-memory domain store.
//!
//! The conditional insert happens under one mutex, so it is atomic within a
//! process. Production uses the SQLite primary key instead.

use crate::domain::{ApexZone, DomainEntry};
use crate::ports::outbound::DomainStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{CallContext, StorageError, Timestamp};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryDomainStore {
    entries: Mutex<HashMap<ApexZone, Timestamp>>,
    insert_fault: Mutex<Option<StorageError>>,
}

impl InMemoryDomainStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `insert_if_absent` fail with `err`.
    pub fn fail_inserts_with(&self, err: StorageError) {
        *self.insert_fault.lock() = Some(err);
    }

    pub fn clear_faults(&self) {
        *self.insert_fault.lock() = None;
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl DomainStore for InMemoryDomainStore {
    async fn insert_if_absent(
        &self,
        ctx: &CallContext,
        zone: &ApexZone,
        now: Timestamp,
    ) -> Result<bool, StorageError> {
        ctx.check()?;
        if let Some(err) = self.insert_fault.lock().clone() {
            return Err(err);
        }
        match self.entries.lock().entry(zone.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(now);
                Ok(true)
            }
        }
    }

    async fn find(
        &self,
        ctx: &CallContext,
        zone: &ApexZone,
    ) -> Result<Option<DomainEntry>, StorageError> {
        ctx.check()?;
        Ok(self
            .entries
            .lock()
            .get(zone)
            .map(|first_seen_at| DomainEntry {
                apex_zone: zone.clone(),
                first_seen_at: *first_seen_at,
            }))
    }

    async fn count(&self, ctx: &CallContext) -> Result<u64, StorageError> {
        ctx.check()?;
        Ok(self.entries.lock().len() as u64)
    }
}
