//! # Rate Limiter Service
//!
//! Combines "read current count" and "record this attempt" into one
//! admission check.
//!
//! ## Failure Semantics
//!
//! - Count fails: the error is returned and nothing is recorded. The caller
//!   must treat the call as indeterminate.
//! - Record fails after a successful count: the decision computed from the
//!   count is returned with [`RateDecision::record_failure`] set.

mod identity_locks;

use crate::domain::{RateDecision, RateLimitPolicy};
use crate::ports::outbound::AttemptLedger;
use identity_locks::IdentityLocks;
use shared_types::{CallContext, Identity, StorageError, Timestamp};
use std::sync::Arc;
use tracing::{debug, warn};

/// Rolling-window rate limiter over an [`AttemptLedger`].
pub struct RateLimiter {
    ledger: Arc<dyn AttemptLedger>,
    policy: RateLimitPolicy,
    locks: Option<IdentityLocks>,
}

impl RateLimiter {
    /// Create a limiter. The ledger handle is shared, never global.
    pub fn new(ledger: Arc<dyn AttemptLedger>, policy: RateLimitPolicy) -> Self {
        let locks = policy
            .is_serialized_per_identity()
            .then(IdentityLocks::new);
        Self {
            ledger,
            policy,
            locks,
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Check whether `identity` may act at `now`, recording the attempt.
    ///
    /// The attempt is recorded whether or not it is allowed.
    pub async fn can_pass(
        &self,
        ctx: &CallContext,
        identity: &Identity,
        now: Timestamp,
    ) -> Result<RateDecision, StorageError> {
        let _serialized = match &self.locks {
            Some(locks) => Some(ctx.guard(locks.acquire(identity)).await?),
            None => None,
        };

        let window_start = self.policy.window_start(now);
        let count = self
            .ledger
            .count_attempts(ctx, identity, window_start)
            .await?;
        let allowed = self.policy.allows(count);

        let record_failure = match self.ledger.record_attempt(ctx, identity, now).await {
            Ok(()) => None,
            Err(err) => {
                warn!(
                    identity = %identity,
                    allowed,
                    error = %err,
                    "Failed to record rate limit attempt"
                );
                Some(err)
            }
        };

        debug!(
            identity = %identity,
            attempts_in_window = count,
            max_attempts = self.policy.max_attempts(),
            allowed,
            "Rate limit check"
        );

        Ok(RateDecision {
            allowed,
            attempts_in_window: count,
            record_failure,
        })
    }

    /// Delete attempts that can no longer fall inside any window ending at or
    /// after `now`.
    pub async fn prune_expired(
        &self,
        ctx: &CallContext,
        now: Timestamp,
    ) -> Result<u64, StorageError> {
        let cutoff = self.policy.window_start(now);
        self.ledger.prune_before(ctx, cutoff).await
    }
}
