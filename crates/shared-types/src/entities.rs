//! # Core Entities
//!
//! The submitter identity and the timestamp representation used across the
//! ledger and the catalog.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wall-clock timestamp. Always UTC.
pub type Timestamp = DateTime<Utc>;

/// Opaque, stable identifier of a message submitter.
///
/// Supplied by the transport layer. The core never interprets it beyond
/// equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Create an identity from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for Identity {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// Convert a timestamp to milliseconds since the Unix epoch (storage form).
pub fn timestamp_to_millis(ts: Timestamp) -> i64 {
    ts.timestamp_millis()
}

/// Convert stored milliseconds back into a timestamp.
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn timestamp_from_millis(millis: i64) -> Option<Timestamp> {
    Utc.timestamp_millis_opt(millis).single()
}
