//! # Rate Limit Policy
//!
//! Configuration, not persisted state. Shared and read-only once built.

use super::errors::RateLimitError;
use chrono::DateTime;
use shared_types::{StorageError, Timestamp};
use std::time::Duration;

/// Default quota carried over from the production deployment: 200 per day.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 200;

/// Default rolling window (24 hours).
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Maximum attempts per identity within a rolling window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    max_attempts: u32,
    window: Duration,
    window_delta: chrono::Duration,
    serialize_per_identity: bool,
}

impl RateLimitPolicy {
    /// Build a policy. Both values must be positive.
    pub fn new(max_attempts: u32, window: Duration) -> Result<Self, RateLimitError> {
        if max_attempts == 0 {
            return Err(RateLimitError::ZeroMaxAttempts);
        }
        if window.is_zero() {
            return Err(RateLimitError::ZeroWindow);
        }
        let window_delta =
            chrono::Duration::from_std(window).map_err(|_| RateLimitError::WindowOutOfRange {
                secs: window.as_secs(),
            })?;

        Ok(Self {
            max_attempts,
            window,
            window_delta,
            serialize_per_identity: false,
        })
    }

    /// Serialize count+record per identity inside this process.
    ///
    /// Removes the bounded over-admission between concurrent callers that
    /// share this limiter. Callers in other processes are not affected.
    pub fn serialize_per_identity(mut self, enabled: bool) -> Self {
        self.serialize_per_identity = enabled;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_serialized_per_identity(&self) -> bool {
        self.serialize_per_identity
    }

    /// Start of the rolling window ending at `now`.
    pub fn window_start(&self, now: Timestamp) -> Timestamp {
        now.checked_sub_signed(self.window_delta)
            .unwrap_or(DateTime::<chrono::Utc>::MIN_UTC)
    }

    /// Whether `count` prior attempts still leave room for one more.
    pub fn allows(&self, count: u64) -> bool {
        count < u64::from(self.max_attempts)
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            window: DEFAULT_WINDOW,
            window_delta: chrono::Duration::seconds(DEFAULT_WINDOW.as_secs() as i64),
            serialize_per_identity: false,
        }
    }
}

/// Result of a single admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateDecision {
    /// Whether the action that prompted the check may proceed.
    pub allowed: bool,
    /// Attempts counted in the window before this one was recorded.
    pub attempts_in_window: u64,
    /// Set when the count succeeded but recording this attempt failed.
    ///
    /// The decision above still stands. The failure is surfaced so the caller
    /// can log it.
    pub record_failure: Option<StorageError>,
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }
}
