//! # Adapters
//!
//! In-memory ledger for unit tests and examples. The durable SQLite adapter
//! lives in the runtime crate.

pub mod memory;

pub use memory::InMemoryAttemptLedger;
