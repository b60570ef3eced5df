//! Cross-subsystem integration tests.

pub mod pipeline_flows;
pub mod sqlite_concurrency;

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};
    use di_01_rate_limiter::{RateLimitPolicy, RateLimiter};
    use di_02_domain_catalog::DomainCatalog;
    use di_03_ingestion::IngestionPipeline;
    use intake_runtime::{SqliteConfig, SqliteStore};
    use shared_types::CallContext;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    pub fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap()
    }

    /// Open a store on `path` and bring its schema up to date.
    pub async fn open_store(path: &Path) -> Arc<SqliteStore> {
        let store = SqliteStore::open(SqliteConfig::for_testing(path)).unwrap();
        store.migrate(&CallContext::background()).await.unwrap();
        Arc::new(store)
    }

    pub fn pipeline(store: &Arc<SqliteStore>, policy: RateLimitPolicy) -> IngestionPipeline {
        let limiter = Arc::new(RateLimiter::new(store.clone(), policy));
        let catalog = Arc::new(DomainCatalog::new(store.clone()));
        IngestionPipeline::new(limiter, catalog)
    }
}
