//! # Background Handlers
//!
//! Long-running tasks owned by the runtime, each stopped through the shared
//! shutdown channel.

pub mod prune_sweep;

pub use prune_sweep::PruneSweep;
