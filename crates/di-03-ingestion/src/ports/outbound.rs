//! # Outbound Ports
//!
//! Storage is reached through the rate limiter and the catalog. The only
//! port owned by the pipeline is the extraction heuristic, so it can be
//! replaced without touching the flow.

use di_02_domain_catalog::{ApexZone, MalformedInputError};

/// Derives an apex zone from free-form text.
pub trait ZoneExtractor: Send + Sync {
    fn extract(&self, raw_message: &str) -> Result<ApexZone, MalformedInputError>;
}

impl<F> ZoneExtractor for F
where
    F: Fn(&str) -> Result<ApexZone, MalformedInputError> + Send + Sync,
{
    fn extract(&self, raw_message: &str) -> Result<ApexZone, MalformedInputError> {
        self(raw_message)
    }
}
