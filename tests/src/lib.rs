//! # Domain Intake Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── pipeline_flows.rs      # di-01 + di-02 + di-03 over SQLite
//!     └── sqlite_concurrency.rs  # several connections on one database file
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p di-tests
//! cargo test -p di-tests integration::sqlite_concurrency
//! ```

pub mod integration;
