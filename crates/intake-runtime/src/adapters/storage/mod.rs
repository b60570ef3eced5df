//! # Production Storage Adapters
//!
//! SQLite backs both the attempt ledger (di-01) and the domain catalog
//! (di-02). Each table is owned by exactly one port.
//!
//! | Table | Port | Key |
//! |-------|------|-----|
//! | `attempts` | `AttemptLedger` | none, indexed on `(identity, occurred_at)` |
//! | `domains` | `DomainStore` | `apex_zone` primary key |
//! | `migrations` | schema bootstrap | autoincrement id |

pub mod schema;
pub mod sqlite_adapter;

pub use schema::{apply_migrations, current_version, Migration, MIGRATIONS};
pub use sqlite_adapter::{SqliteConfig, SqliteStore};
