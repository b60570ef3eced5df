//! # Adapters
//!
//! Driven-side implementations wired into the subsystem services.

pub mod storage;

pub use storage::{SqliteConfig, SqliteStore};
