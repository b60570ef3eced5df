//! # Error Types
//!
//! Storage faults shared by the attempt ledger and the domain catalog.
//!
//! Duplicate domains and exhausted quotas are NOT represented here: they are
//! expected business states and travel through the pipeline outcome.

use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// I/O or engine failure.
    #[error("Storage I/O error during {operation}: {message}")]
    Io {
        operation: &'static str,
        message: String,
    },

    /// The call's deadline passed before the operation completed.
    #[error("Storage deadline exceeded")]
    Timeout,

    /// The call was cancelled by its owner.
    #[error("Storage operation cancelled")]
    Cancelled,

    /// A query targeted a table that does not exist (schema not bootstrapped).
    #[error("Table '{table}' does not exist")]
    MissingTable { table: String },

    /// Constraint violation other than the expected catalog conflict.
    #[error("Constraint violation during {operation}: {message}")]
    Constraint {
        operation: &'static str,
        message: String,
    },

    /// A stored row could not be decoded.
    #[error("Corrupt row in '{table}': {message}")]
    Corrupt {
        table: &'static str,
        message: String,
    },
}

impl StorageError {
    /// Shorthand for an [`StorageError::Io`] error.
    pub fn io(operation: &'static str, message: impl Into<String>) -> Self {
        StorageError::Io {
            operation,
            message: message.into(),
        }
    }

    /// Whether the error came from the call context rather than the backend.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, StorageError::Timeout | StorageError::Cancelled)
    }
}
