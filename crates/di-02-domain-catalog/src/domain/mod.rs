//! # Domain Layer

pub mod apex_zone;
pub mod entities;
pub mod errors;
pub mod extraction;

pub use apex_zone::{ApexZone, MAX_LABELS};
pub use entities::DomainEntry;
pub use errors::MalformedInputError;
pub use extraction::extract_apex_zone;
