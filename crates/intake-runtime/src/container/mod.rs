//! # Service Container
//!
//! Holds the wired subsystem instances.
//!
//! ## Initialization Order
//!
//! 1. Validate configuration
//! 2. Open SQLite and apply pending migrations
//! 3. Rate limiter (di-01) and domain catalog (di-02) over the shared store
//! 4. Ingestion pipeline (di-03)

pub mod config;
pub mod services;

pub use config::{
    load_dotenv, load_env_file, ConfigError, RateLimitConfig, RuntimeConfig, StorageConfig,
    DEFAULT_MAX_IN_FLIGHT,
};
pub use services::{ContainerError, IntakeContainer};
