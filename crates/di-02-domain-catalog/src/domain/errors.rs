//! # Domain Errors
//!
//! Extraction failures. These describe bad input, not system faults.

use thiserror::Error;

/// Why a message did not yield an apex zone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedInputError {
    /// No URL-like or bare-host token in the message.
    #[error("No URL or host name found in message")]
    NoHostToken,

    /// Host has no apex/TLD split.
    #[error("Could not find apex zone and TLD parts in '{host}'")]
    TooFewLabels { host: String },

    /// Host is nested too deeply.
    #[error("Subdomain depth exceeded in '{host}': {labels} labels, max {max}")]
    TooDeep {
        host: String,
        labels: usize,
        max: usize,
    },

    /// Empty label or a character that cannot appear in a host name.
    #[error("Invalid host name '{host}'")]
    InvalidLabel { host: String },
}
