//! # Outcome
//!
//! Terminal result of one ingestion call. Duplicate, rate-limited and
//! malformed messages are normal outcomes, not errors.

use super::errors::IngestError;
use di_02_domain_catalog::{ApexZone, MalformedInputError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// First time this zone was seen; it is now durably recorded.
    Admitted(ApexZone),
    /// The zone was already in the catalog.
    Duplicate(ApexZone),
    /// The identity exhausted its quota for the current window.
    RateLimited,
    /// No apex zone could be extracted from the message.
    Malformed(MalformedInputError),
    /// Storage failed; the call did not complete.
    Failed(IngestError),
}

impl Outcome {
    /// Stable lowercase label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Admitted(_) => "admitted",
            Outcome::Duplicate(_) => "duplicate",
            Outcome::RateLimited => "rate_limited",
            Outcome::Malformed(_) => "malformed",
            Outcome::Failed(_) => "failed",
        }
    }

    pub fn zone(&self) -> Option<&ApexZone> {
        match self {
            Outcome::Admitted(zone) | Outcome::Duplicate(zone) => Some(zone),
            _ => None,
        }
    }

    pub fn is_admitted(&self) -> bool {
        matches!(self, Outcome::Admitted(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}
