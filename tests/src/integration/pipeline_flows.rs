//! # Pipeline Flows over SQLite
//!
//! The full ingest path (rate limit → extract → catalog) against a real
//! database file.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{open_store, pipeline, t0, DAY};
    use chrono::Duration as ChronoDuration;
    use di_01_rate_limiter::{AttemptLedger, RateLimitPolicy};
    use di_02_domain_catalog::{ApexZone, DomainStore, MalformedInputError};
    use di_03_ingestion::{IngestError, Outcome, Stage};
    use intake_runtime::{SqliteConfig, SqliteStore};
    use shared_types::{CallContext, Identity, StorageError};
    use std::sync::Arc;

    fn zone(s: &str) -> ApexZone {
        ApexZone::parse(s).unwrap()
    }

    // =========================================================================
    // SCENARIOS
    // =========================================================================

    #[tokio::test]
    async fn test_admitted_duplicate_rate_limited_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir.path().join("flow.db")).await;
        let pipeline = pipeline(&store, RateLimitPolicy::new(2, DAY).unwrap());
        let ctx = CallContext::background();
        let u1 = Identity::new("U1");
        let msg = "https://sub.example.com/x";

        let outcomes = [
            pipeline.ingest(&ctx, &u1, msg, t0()).await,
            pipeline
                .ingest(&ctx, &u1, msg, t0() + ChronoDuration::minutes(15))
                .await,
            pipeline
                .ingest(&ctx, &u1, msg, t0() + ChronoDuration::minutes(45))
                .await,
        ];

        assert_eq!(
            outcomes,
            [
                Outcome::Admitted(zone("example.com")),
                Outcome::Duplicate(zone("example.com")),
                Outcome::RateLimited,
            ]
        );
        assert_eq!(
            store
                .count_attempts(&ctx, &u1, t0() - ChronoDuration::days(1))
                .await
                .unwrap(),
            3
        );
        assert_eq!(DomainStore::count(store.as_ref(), &ctx).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_malformed_submission_uses_quota() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir.path().join("flow.db")).await;
        let pipeline = pipeline(&store, RateLimitPolicy::new(2, DAY).unwrap());
        let ctx = CallContext::background();
        let u2 = Identity::new("U2");

        let outcome = pipeline.ingest(&ctx, &u2, "not a url at all", t0()).await;

        assert_eq!(outcome, Outcome::Malformed(MalformedInputError::NoHostToken));
        assert_eq!(store.count_attempts(&ctx, &u2, t0()).await.unwrap(), 1);
        assert_eq!(DomainStore::count(store.as_ref(), &ctx).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_window_slides_past_old_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir.path().join("flow.db")).await;
        let pipeline = pipeline(&store, RateLimitPolicy::new(1, DAY).unwrap());
        let ctx = CallContext::background();
        let who = Identity::new("U3");

        assert!(pipeline.ingest(&ctx, &who, "a.com", t0()).await.is_admitted());
        assert_eq!(
            pipeline
                .ingest(&ctx, &who, "b.com", t0() + ChronoDuration::hours(23))
                .await,
            Outcome::RateLimited
        );
        assert_eq!(
            pipeline
                .ingest(
                    &ctx,
                    &who,
                    "c.com",
                    t0() + ChronoDuration::days(1) + ChronoDuration::hours(23) + ChronoDuration::milliseconds(1)
                )
                .await,
            Outcome::Admitted(zone("c.com"))
        );
    }

    #[tokio::test]
    async fn test_quota_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restart.db");
        let ctx = CallContext::background();
        let who = Identity::new("U4");
        {
            let store = open_store(&path).await;
            let pipeline = pipeline(&store, RateLimitPolicy::new(2, DAY).unwrap());
            pipeline.ingest(&ctx, &who, "one.com", t0()).await;
            pipeline.ingest(&ctx, &who, "two.com", t0()).await;
        }

        let store = open_store(&path).await;
        let pipeline = pipeline(&store, RateLimitPolicy::new(2, DAY).unwrap());

        assert_eq!(
            pipeline
                .ingest(&ctx, &who, "three.com", t0() + ChronoDuration::hours(1))
                .await,
            Outcome::RateLimited
        );
        assert_eq!(
            pipeline
                .ingest(&ctx, &Identity::new("U5"), "one.com", t0())
                .await,
            Outcome::Duplicate(zone("one.com"))
        );
    }

    // =========================================================================
    // FAILURE PATHS
    // =========================================================================

    #[tokio::test]
    async fn test_missing_schema_fails_at_rate_limit_stage() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            Arc::new(SqliteStore::open(SqliteConfig::for_testing(dir.path().join("bare.db"))).unwrap());
        let pipeline = pipeline(&store, RateLimitPolicy::new(5, DAY).unwrap());

        let outcome = pipeline
            .ingest(
                &CallContext::background(),
                &Identity::new("U1"),
                "example.com",
                t0(),
            )
            .await;

        assert_eq!(
            outcome,
            Outcome::Failed(IngestError::new(
                Stage::RateLimit,
                StorageError::MissingTable {
                    table: "attempts".to_string()
                }
            ))
        );
    }

    #[tokio::test]
    async fn test_expired_deadline_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir.path().join("deadline.db")).await;
        let pipeline = pipeline(&store, RateLimitPolicy::new(5, DAY).unwrap());
        let expired = CallContext::background().deadline_at(tokio::time::Instant::now());
        let who = Identity::new("U1");

        let outcome = pipeline.ingest(&expired, &who, "example.com", t0()).await;

        assert_eq!(
            outcome,
            Outcome::Failed(IngestError::rate_limit(StorageError::Timeout))
        );
        let ctx = CallContext::background();
        assert_eq!(store.count_attempts(&ctx, &who, t0()).await.unwrap(), 0);
        assert!(store.find(&ctx, &zone("example.com")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancelled_call_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir.path().join("cancel.db")).await;
        let pipeline = pipeline(&store, RateLimitPolicy::new(5, DAY).unwrap());
        let (tx, rx) = tokio::sync::watch::channel(false);
        tx.send(true).unwrap();
        let ctx = CallContext::background().cancelled_by(rx);

        let outcome = pipeline
            .ingest(&ctx, &Identity::new("U1"), "example.com", t0())
            .await;

        assert_eq!(
            outcome,
            Outcome::Failed(IngestError::rate_limit(StorageError::Cancelled))
        );
        assert_eq!(
            DomainStore::count(store.as_ref(), &CallContext::background())
                .await
                .unwrap(),
            0
        );
    }
}
