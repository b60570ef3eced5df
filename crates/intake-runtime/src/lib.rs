//! # Intake Runtime Library
//!
//! Wiring for the domain intake service: SQLite storage adapter, schema
//! bootstrap, environment configuration, the JSON-lines transport and the
//! maintenance sweep. The executable entry point is `main.rs`.
//!
//! ## Architectural Patterns
//!
//! - **Hexagonal Architecture**: subsystems define ports, this crate provides
//!   the production adapters
//! - **Explicit handles**: the store is passed to each service at
//!   construction, never reached through a global

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod transport;

pub use adapters::{SqliteConfig, SqliteStore};
pub use container::{ContainerError, IntakeContainer, RuntimeConfig};
pub use handlers::PruneSweep;
pub use transport::{serve, Router, ServeSummary};
