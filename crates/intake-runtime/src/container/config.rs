//! # Runtime Configuration
//!
//! Environment-driven configuration for the intake service.
//!
//! ## Requirements
//!
//! - `max_attempts`, the window and the per-call timeout must be non-zero
//! - `TZ`, when set, must be `UTC`; stored timestamps are UTC milliseconds
//! - At least one message must be allowed in flight
//!
//! A `.env` file is read by [`load_dotenv`] before the environment is
//! consulted. Variables already set in the process environment win.

use crate::adapters::SqliteConfig;
use di_01_rate_limiter::{RateLimitError, RateLimitPolicy};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default cap on concurrently routed messages.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Rate limit configuration.
    pub rate_limit: RateLimitConfig,
    /// Deadline for all storage work done on behalf of one message.
    pub op_timeout: Duration,
    /// Messages routed concurrently before reading pauses.
    pub max_in_flight: usize,
    /// Maintenance sweep period. `None` disables the sweep.
    pub prune_interval: Option<Duration>,
    /// Label attached to operator alerts.
    pub operator_channel: Option<String>,
    /// Value of `TZ` at startup, if any.
    pub timezone: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            rate_limit: RateLimitConfig::default(),
            op_timeout: Duration::from_millis(5_000),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            prune_interval: Some(Duration::from_secs(3_600)),
            operator_channel: None,
            timezone: None,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// SQLite busy timeout.
    pub busy_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("domains.db"),
            busy_timeout: Duration::from_millis(5_000),
        }
    }
}

/// Rate limit configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Attempts allowed per window per identity.
    pub max_attempts: u32,
    /// Rolling window length.
    pub window: Duration,
    /// Serialize count+record per identity inside this process.
    pub serialize_per_identity: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 200,
            window: Duration::from_secs(86_400),
            serialize_per_identity: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Environment variable {key} has invalid value '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid rate limit policy: {0}")]
    Policy(#[from] RateLimitError),

    #[error("Per-message storage timeout must be greater than zero")]
    ZeroTimeout,

    #[error("TZ must be UTC when set, found '{0}'")]
    NonUtcTimezone(String),

    #[error("At least one message must be allowed in flight")]
    ZeroInFlight,

    #[error("Failed to load environment file: {0}")]
    EnvFile(String),
}

/// Load `.env` from the working directory or one of its parents.
///
/// Returns the file that was read, or `None` when there is none.
pub fn load_dotenv() -> Result<Option<PathBuf>, ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(err) if err.not_found() => Ok(None),
        Err(err) => Err(ConfigError::EnvFile(err.to_string())),
    }
}

/// Load variables from an explicit file. Existing variables are kept.
pub fn load_env_file(path: &Path) -> Result<(), ConfigError> {
    dotenvy::from_path(path)
        .map_err(|err| ConfigError::EnvFile(format!("{}: {err}", path.display())))
}

impl RuntimeConfig {
    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `DI_DB_PATH`: SQLite file (default: domains.db)
    /// - `DI_MAX_ATTEMPTS`: attempts per window (default: 200)
    /// - `DI_WINDOW_SECS`: window length (default: 86400)
    /// - `DI_SERIALIZE_PER_IDENTITY`: per-identity lock (default: false)
    /// - `DI_OP_TIMEOUT_MS`: per-message storage deadline (default: 5000)
    /// - `DI_MAX_IN_FLIGHT`: concurrently routed messages (default: 64)
    /// - `DI_BUSY_TIMEOUT_MS`: SQLite busy timeout (default: 5000)
    /// - `DI_PRUNE_INTERVAL_SECS`: sweep period, 0 disables (default: 3600)
    /// - `DI_OPERATOR_CHANNEL`: operator alert label (default: unset)
    /// - `TZ`: must be UTC when set
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`RuntimeConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let db_path = var("DI_DB_PATH")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.storage.db_path);
        let busy_timeout_ms = parse(&var, "DI_BUSY_TIMEOUT_MS", 5_000u64)?;
        let max_attempts = parse(&var, "DI_MAX_ATTEMPTS", defaults.rate_limit.max_attempts)?;
        let window_secs = parse(&var, "DI_WINDOW_SECS", 86_400u64)?;
        let serialize_per_identity = parse_flag(&var, "DI_SERIALIZE_PER_IDENTITY")?;
        let op_timeout_ms = parse(&var, "DI_OP_TIMEOUT_MS", 5_000u64)?;
        let max_in_flight = parse(&var, "DI_MAX_IN_FLIGHT", defaults.max_in_flight)?;
        let prune_secs = parse(&var, "DI_PRUNE_INTERVAL_SECS", 3_600u64)?;

        Ok(Self {
            storage: StorageConfig {
                db_path,
                busy_timeout: Duration::from_millis(busy_timeout_ms),
            },
            rate_limit: RateLimitConfig {
                max_attempts,
                window: Duration::from_secs(window_secs),
                serialize_per_identity,
            },
            op_timeout: Duration::from_millis(op_timeout_ms),
            max_in_flight,
            prune_interval: (prune_secs > 0).then(|| Duration::from_secs(prune_secs)),
            operator_channel: var("DI_OPERATOR_CHANNEL").filter(|v| !v.is_empty()),
            timezone: var("TZ"),
        })
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rate_limit_policy()?;
        if self.op_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.max_in_flight == 0 {
            return Err(ConfigError::ZeroInFlight);
        }
        if let Some(tz) = &self.timezone {
            if tz != "UTC" {
                return Err(ConfigError::NonUtcTimezone(tz.clone()));
            }
        }
        Ok(())
    }

    pub fn rate_limit_policy(&self) -> Result<RateLimitPolicy, RateLimitError> {
        Ok(
            RateLimitPolicy::new(self.rate_limit.max_attempts, self.rate_limit.window)?
                .serialize_per_identity(self.rate_limit.serialize_per_identity),
        )
    }

    pub fn sqlite_config(&self) -> SqliteConfig {
        SqliteConfig {
            busy_timeout: self.storage.busy_timeout,
            ..SqliteConfig::new(self.storage.db_path.clone())
        }
    }
}

fn parse<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}

fn parse_flag(var: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<bool, ConfigError> {
    match var(key).as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => Ok(true),
        Some(v) if v == "0" || v.eq_ignore_ascii_case("false") => Ok(false),
        Some(v) => Err(ConfigError::InvalidValue {
            key,
            value: v.to_string(),
        }),
    }
}
