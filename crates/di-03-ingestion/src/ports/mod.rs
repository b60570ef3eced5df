//! # Ports

pub mod inbound;
pub mod outbound;

pub use inbound::IngestApi;
pub use outbound::ZoneExtractor;
