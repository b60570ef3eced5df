//! # Ports
//!
//! The limiter has no inbound port of its own; it is driven directly by the
//! ingestion pipeline. Its single driven port is the attempt ledger.

pub mod outbound;

pub use outbound::AttemptLedger;
