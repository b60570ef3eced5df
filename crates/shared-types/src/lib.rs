//! # Shared Types Crate
//!
//! Types shared by every intake subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Identity`, `Timestamp` and `StorageError` are
//!   defined once here and reused by the ledger, the catalog and the pipeline.
//! - **Explicit Call Context**: every storage operation receives a
//!   [`CallContext`] carrying its deadline and cancellation signal. There is no
//!   ambient/global context.
//! - **Outcomes Are Not Errors**: only genuine storage faults live in
//!   [`StorageError`]. Business states (duplicate, rate limited) are modelled by
//!   the pipeline's outcome type.

pub mod context;
pub mod entities;
pub mod errors;

pub use context::CallContext;
pub use entities::*;
pub use errors::*;
