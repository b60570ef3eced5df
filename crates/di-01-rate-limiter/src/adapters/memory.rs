//! In-memory attempt ledger.
//!
//! Single process only, lost on restart. Supports fault injection so callers
//! can exercise storage-error paths without a real backend.

use crate::ports::outbound::AttemptLedger;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{CallContext, Identity, StorageError, Timestamp};
use std::collections::HashMap;

#[derive(Default)]
struct Faults {
    count: Option<StorageError>,
    record: Option<StorageError>,
    prune: Option<StorageError>,
}

/// Attempt ledger held in a `HashMap`.
#[derive(Default)]
pub struct InMemoryAttemptLedger {
    attempts: Mutex<HashMap<Identity, Vec<Timestamp>>>,
    faults: Mutex<Faults>,
}

impl InMemoryAttemptLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `count_attempts` fail with `err`.
    pub fn fail_counts_with(&self, err: StorageError) {
        self.faults.lock().count = Some(err);
    }

    /// Make every subsequent `record_attempt` fail with `err`.
    pub fn fail_records_with(&self, err: StorageError) {
        self.faults.lock().record = Some(err);
    }

    /// Make every subsequent `prune_before` fail with `err`.
    pub fn fail_prunes_with(&self, err: StorageError) {
        self.faults.lock().prune = Some(err);
    }

    pub fn clear_faults(&self) {
        *self.faults.lock() = Faults::default();
    }

    /// Recorded attempts for one identity, oldest first.
    pub fn attempts_for(&self, identity: &Identity) -> Vec<Timestamp> {
        self.attempts
            .lock()
            .get(identity)
            .cloned()
            .unwrap_or_default()
    }

    /// Total recorded attempts across all identities.
    pub fn total_attempts(&self) -> usize {
        self.attempts.lock().values().map(Vec::len).sum()
    }
}

#[async_trait]
impl AttemptLedger for InMemoryAttemptLedger {
    async fn record_attempt(
        &self,
        ctx: &CallContext,
        identity: &Identity,
        now: Timestamp,
    ) -> Result<(), StorageError> {
        ctx.check()?;
        if let Some(err) = self.faults.lock().record.clone() {
            return Err(err);
        }
        let mut attempts = self.attempts.lock();
        let log = attempts.entry(identity.clone()).or_default();
        let pos = log.partition_point(|ts| *ts <= now);
        log.insert(pos, now);
        Ok(())
    }

    async fn count_attempts(
        &self,
        ctx: &CallContext,
        identity: &Identity,
        since: Timestamp,
    ) -> Result<u64, StorageError> {
        ctx.check()?;
        if let Some(err) = self.faults.lock().count.clone() {
            return Err(err);
        }
        let attempts = self.attempts.lock();
        let count = attempts
            .get(identity)
            .map(|log| log.iter().filter(|ts| **ts >= since).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn prune_before(
        &self,
        ctx: &CallContext,
        cutoff: Timestamp,
    ) -> Result<u64, StorageError> {
        ctx.check()?;
        if let Some(err) = self.faults.lock().prune.clone() {
            return Err(err);
        }
        let mut attempts = self.attempts.lock();
        let mut removed = 0u64;
        attempts.retain(|_, log| {
            let before = log.len();
            log.retain(|ts| *ts >= cutoff);
            removed += (before - log.len()) as u64;
            !log.is_empty()
        });
        Ok(removed)
    }
}
