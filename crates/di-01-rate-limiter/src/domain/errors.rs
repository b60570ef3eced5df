//! # Domain Errors

use thiserror::Error;

/// Rate limiter configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitError {
    /// `max_attempts` must be positive.
    #[error("Invalid policy: max_attempts must be greater than zero")]
    ZeroMaxAttempts,

    /// `window` must be positive.
    #[error("Invalid policy: window must be greater than zero")]
    ZeroWindow,

    /// `window` does not fit the timestamp arithmetic range.
    #[error("Invalid policy: window of {secs}s is out of range")]
    WindowOutOfRange { secs: u64 },
}
