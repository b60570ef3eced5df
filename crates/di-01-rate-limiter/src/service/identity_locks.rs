//! Per-identity async locks (optional hardening).
//!
//! Entries exist only while some caller holds or waits on them.

use parking_lot::Mutex;
use shared_types::Identity;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Default)]
pub(crate) struct IdentityLocks {
    locks: Mutex<HashMap<Identity, Arc<AsyncMutex<()>>>>,
}

impl IdentityLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait until `identity` is free and hold it until the guard drops.
    ///
    /// Dropping the returned future before it resolves releases the entry
    /// the same way dropping the guard does.
    pub(crate) async fn acquire(&self, identity: &Identity) -> IdentityGuard<'_> {
        let (waiter, lock) = {
            let mut locks = self.locks.lock();
            let lock = Arc::clone(locks.entry(identity.clone()).or_default());
            let waiter = Waiter {
                owner: self,
                identity: identity.clone(),
                lock: Some(Arc::clone(&lock)),
            };
            (waiter, lock)
        };
        let guard = lock.lock_owned().await;
        waiter.disarm();
        IdentityGuard {
            owner: self,
            identity: identity.clone(),
            guard: Some(guard),
        }
    }

    /// Drop the entry for `identity` if only the map still references it.
    /// Must be called with `locks` held.
    fn release_entry(
        locks: &mut HashMap<Identity, Arc<AsyncMutex<()>>>,
        identity: &Identity,
    ) {
        if let Some(lock) = locks.get(identity) {
            if Arc::strong_count(lock) == 1 {
                locks.remove(identity);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().len()
    }
}

/// Reference held by a caller still waiting in [`IdentityLocks::acquire`].
struct Waiter<'a> {
    owner: &'a IdentityLocks,
    identity: Identity,
    lock: Option<Arc<AsyncMutex<()>>>,
}

impl Waiter<'_> {
    /// The caller now holds the lock; its guard keeps the entry alive.
    fn disarm(mut self) {
        self.lock.take();
    }
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        if let Some(lock) = self.lock.take() {
            let mut locks = self.owner.locks.lock();
            drop(lock);
            IdentityLocks::release_entry(&mut locks, &self.identity);
        }
    }
}

pub(crate) struct IdentityGuard<'a> {
    owner: &'a IdentityLocks,
    identity: Identity,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for IdentityGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self.owner.locks.lock();
        // Release first so a waiter can proceed, then drop the map entry if
        // nobody else references it. Clones are only taken under `locks`.
        self.guard.take();
        IdentityLocks::release_entry(&mut locks, &self.identity);
    }
}
