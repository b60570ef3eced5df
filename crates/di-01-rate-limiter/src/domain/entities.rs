//! # Domain Entities

use shared_types::{Identity, Timestamp};

/// One rate-limit-relevant action by one identity.
///
/// Recorded once per admission check, whether the check allowed the action
/// or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// Submitter.
    pub identity: Identity,
    /// When the attempt was made.
    pub occurred_at: Timestamp,
}

impl Attempt {
    pub fn new(identity: Identity, occurred_at: Timestamp) -> Self {
        Self {
            identity,
            occurred_at,
        }
    }

    /// Whether this attempt falls inside a window starting at `since`.
    pub fn is_within(&self, since: Timestamp) -> bool {
        self.occurred_at >= since
    }
}
