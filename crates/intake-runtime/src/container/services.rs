//! # Wired Services

use super::config::{ConfigError, RuntimeConfig};
use crate::adapters::SqliteStore;
use crate::handlers::PruneSweep;
use crate::transport::Router;
use di_01_rate_limiter::RateLimiter;
use di_02_domain_catalog::DomainCatalog;
use di_03_ingestion::IngestionPipeline;
use shared_types::{CallContext, StorageError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage initialization failed: {0}")]
    Storage(#[from] StorageError),
}

/// All services sharing one SQLite store.
pub struct IntakeContainer {
    pub config: RuntimeConfig,
    pub store: Arc<SqliteStore>,
    pub limiter: Arc<RateLimiter>,
    pub catalog: Arc<DomainCatalog>,
    pub pipeline: Arc<IngestionPipeline>,
}

impl IntakeContainer {
    /// Validate `config`, open the database, migrate, and wire the services.
    pub async fn open(config: RuntimeConfig) -> Result<Self, ContainerError> {
        config.validate()?;
        let policy = config.rate_limit_policy().map_err(ConfigError::from)?;

        let store = Arc::new(SqliteStore::open(config.sqlite_config())?);
        store.migrate(&CallContext::background()).await?;

        let limiter = Arc::new(RateLimiter::new(store.clone(), policy));
        let catalog = Arc::new(DomainCatalog::new(store.clone()));
        let pipeline = Arc::new(IngestionPipeline::new(limiter.clone(), catalog.clone()));

        info!(
            db_path = %store.path().display(),
            max_attempts = config.rate_limit.max_attempts,
            window_secs = config.rate_limit.window.as_secs(),
            serialize_per_identity = config.rate_limit.serialize_per_identity,
            "Intake services initialized"
        );

        Ok(Self {
            config,
            store,
            limiter,
            catalog,
            pipeline,
        })
    }

    pub fn router(&self) -> Router {
        Router::new(self.pipeline.clone(), self.config.op_timeout)
            .with_operator_channel(self.config.operator_channel.clone())
    }

    /// `None` when the sweep is disabled.
    pub fn prune_sweep(&self) -> Option<PruneSweep> {
        self.config.prune_interval.map(|interval| {
            PruneSweep::new(self.limiter.clone(), interval, self.config.op_timeout)
        })
    }
}
