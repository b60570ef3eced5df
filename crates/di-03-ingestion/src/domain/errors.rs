//! # Error Types

use shared_types::StorageError;
use std::fmt;
use thiserror::Error;

/// Pipeline stage that touches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Counting or recording the attempt.
    RateLimit,
    /// Inserting the apex zone.
    Catalog,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::RateLimit => "rate_limit",
            Stage::Catalog => "catalog",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A storage failure at a named stage. Nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Ingestion failed at {stage} stage: {source}")]
pub struct IngestError {
    pub stage: Stage,
    #[source]
    pub source: StorageError,
}

impl IngestError {
    pub fn new(stage: Stage, source: StorageError) -> Self {
        Self { stage, source }
    }

    pub fn rate_limit(source: StorageError) -> Self {
        Self::new(Stage::RateLimit, source)
    }

    pub fn catalog(source: StorageError) -> Self {
        Self::new(Stage::Catalog, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_display_names_stage_and_cause() {
        let err = IngestError::catalog(StorageError::Timeout);
        let msg = err.to_string();
        assert!(msg.contains("catalog"));
        assert!(msg.contains("deadline"));
    }

    #[test]
    fn test_source_is_storage_error() {
        let err = IngestError::rate_limit(StorageError::io("count_attempts", "locked"));
        let source = err.source().expect("has source");
        assert!(source.to_string().contains("count_attempts"));
    }
}
