//! # Domain Entities

use super::apex_zone::ApexZone;
use serde::{Deserialize, Serialize};
use shared_types::Timestamp;

/// One admitted, deduplicated apex zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEntry {
    /// Unique key.
    pub apex_zone: ApexZone,
    /// When the zone was first admitted.
    pub first_seen_at: Timestamp,
}
