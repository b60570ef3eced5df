//! # Ingestion Pipeline Tests
//!
//! In-memory ledger and store with injected faults, plus a stalling ledger
//! for deadline behavior.

use super::*;
use crate::domain::Stage;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use di_01_rate_limiter::{AttemptLedger, InMemoryAttemptLedger, RateLimitPolicy};
use di_02_domain_catalog::{ApexZone, InMemoryDomainStore, MalformedInputError};
use shared_types::StorageError;
use std::time::Duration;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

struct Harness {
    ledger: Arc<InMemoryAttemptLedger>,
    store: Arc<InMemoryDomainStore>,
    pipeline: IngestionPipeline,
}

fn harness(max_attempts: u32) -> Harness {
    let ledger = Arc::new(InMemoryAttemptLedger::new());
    let store = Arc::new(InMemoryDomainStore::new());
    let policy = RateLimitPolicy::new(max_attempts, DAY).unwrap();
    let limiter = Arc::new(RateLimiter::new(ledger.clone(), policy));
    let catalog = Arc::new(DomainCatalog::new(store.clone()));
    Harness {
        ledger,
        store,
        pipeline: IngestionPipeline::new(limiter, catalog),
    }
}

fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap()
}

fn zone(s: &str) -> ApexZone {
    ApexZone::parse(s).unwrap()
}

#[tokio::test]
async fn test_admitted_then_duplicate_then_rate_limited() {
    let h = harness(2);
    let ctx = CallContext::background();
    let u1 = Identity::new("U1");
    let msg = "https://sub.example.com/x";

    let first = h.pipeline.ingest(&ctx, &u1, msg, t0()).await;
    let second = h
        .pipeline
        .ingest(&ctx, &u1, msg, t0() + ChronoDuration::minutes(20))
        .await;
    let third = h
        .pipeline
        .ingest(&ctx, &u1, msg, t0() + ChronoDuration::minutes(40))
        .await;

    assert_eq!(first, Outcome::Admitted(zone("example.com")));
    assert_eq!(second, Outcome::Duplicate(zone("example.com")));
    assert_eq!(third, Outcome::RateLimited);
    assert_eq!(h.store.len(), 1);
    assert_eq!(h.ledger.attempts_for(&u1).len(), 3);
}

#[tokio::test]
async fn test_malformed_message_consumes_quota() {
    let h = harness(2);
    let u2 = Identity::new("U2");

    let outcome = h
        .pipeline
        .ingest(&CallContext::background(), &u2, "not a url at all", t0())
        .await;

    assert_eq!(outcome, Outcome::Malformed(MalformedInputError::NoHostToken));
    assert_eq!(h.ledger.attempts_for(&u2).len(), 1);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_rate_limited_message_is_not_extracted() {
    let h = harness(1);
    let ctx = CallContext::background();
    let who = Identity::new("U3");

    h.pipeline.ingest(&ctx, &who, "a.com", t0()).await;
    let outcome = h.pipeline.ingest(&ctx, &who, "b.com", t0()).await;

    assert_eq!(outcome, Outcome::RateLimited);
    assert_eq!(h.store.len(), 1);
}

#[tokio::test]
async fn test_count_failure_is_failed_and_writes_nothing() {
    let h = harness(5);
    h.ledger.fail_counts_with(StorageError::Timeout);
    let who = Identity::new("U1");

    let outcome = h
        .pipeline
        .ingest(&CallContext::background(), &who, "example.com", t0())
        .await;

    assert_eq!(
        outcome,
        Outcome::Failed(IngestError::new(Stage::RateLimit, StorageError::Timeout))
    );
    assert_eq!(h.ledger.total_attempts(), 0);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_catalog_failure_is_failed_not_duplicate() {
    let h = harness(5);
    h.store
        .fail_inserts_with(StorageError::io("insert_if_absent", "disk I/O error"));

    let outcome = h
        .pipeline
        .ingest(&CallContext::background(), &Identity::new("U1"), "example.com", t0())
        .await;

    match outcome {
        Outcome::Failed(err) => {
            assert_eq!(err.stage, Stage::Catalog);
            assert!(matches!(err.source, StorageError::Io { .. }));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_record_failure_still_admits() {
    let h = harness(5);
    h.ledger
        .fail_records_with(StorageError::io("record_attempt", "readonly database"));

    let outcome = h
        .pipeline
        .ingest(&CallContext::background(), &Identity::new("U1"), "example.org", t0())
        .await;

    assert_eq!(outcome, Outcome::Admitted(zone("example.org")));
}

#[tokio::test]
async fn test_record_failure_is_counted_as_storage_error() {
    let h = harness(5);
    h.ledger
        .fail_records_with(StorageError::io("record_attempt", "disk I/O error"));
    let counter = intake_telemetry::metrics::STORAGE_ERRORS
        .with_label_values(&[RECORD_FAILURE_STAGE]);
    let before = counter.get();

    let outcome = h
        .pipeline
        .ingest(&CallContext::background(), &Identity::new("U7"), "counted.net", t0())
        .await;

    assert!(outcome.is_admitted());
    assert!(counter.get() >= before + 1.0);
}

#[tokio::test]
async fn test_expired_deadline_fails_and_writes_nothing() {
    let h = harness(5);
    let ctx = CallContext::background().deadline_at(tokio::time::Instant::now());

    let outcome = h
        .pipeline
        .ingest(&ctx, &Identity::new("U1"), "example.com", t0())
        .await;

    assert_eq!(
        outcome,
        Outcome::Failed(IngestError::rate_limit(StorageError::Timeout))
    );
    assert_eq!(h.ledger.total_attempts(), 0);
    assert!(h.store.is_empty());
}

/// Ledger whose count never completes on its own.
struct StallingLedger;

#[async_trait]
impl AttemptLedger for StallingLedger {
    async fn record_attempt(
        &self,
        _ctx: &CallContext,
        _identity: &Identity,
        _now: Timestamp,
    ) -> Result<(), StorageError> {
        panic!("record must not run after a failed count");
    }

    async fn count_attempts(
        &self,
        ctx: &CallContext,
        _identity: &Identity,
        _since: Timestamp,
    ) -> Result<u64, StorageError> {
        ctx.guard(std::future::pending::<u64>()).await
    }

    async fn prune_before(
        &self,
        _ctx: &CallContext,
        _cutoff: Timestamp,
    ) -> Result<u64, StorageError> {
        Ok(0)
    }
}

#[tokio::test(start_paused = true)]
async fn test_count_timeout_mid_flight_is_failed() {
    let store = Arc::new(InMemoryDomainStore::new());
    let limiter = Arc::new(RateLimiter::new(
        Arc::new(StallingLedger),
        RateLimitPolicy::new(5, DAY).unwrap(),
    ));
    let pipeline = IngestionPipeline::new(limiter, Arc::new(DomainCatalog::new(store.clone())));
    let ctx = CallContext::with_timeout(Duration::from_millis(250));

    let outcome = pipeline
        .ingest(&ctx, &Identity::new("U1"), "example.com", t0())
        .await;

    assert_eq!(
        outcome,
        Outcome::Failed(IngestError::rate_limit(StorageError::Timeout))
    );
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_custom_extractor_is_used() {
    let h = harness(5);
    let pipeline = IngestionPipeline::new(
        h.pipeline.limiter().clone(),
        h.pipeline.catalog().clone(),
    )
    .with_extractor(Arc::new(|_: &str| ApexZone::parse("fixed.net")));

    let outcome = pipeline
        .ingest(&CallContext::background(), &Identity::new("U1"), "anything", t0())
        .await;

    assert_eq!(outcome, Outcome::Admitted(zone("fixed.net")));
}

#[tokio::test]
async fn test_ingest_api_port_delegates() {
    let h = harness(5);
    let api: &dyn IngestApi = &h.pipeline;

    let outcome = api
        .ingest(&CallContext::background(), &Identity::new("U9"), "www.test.ir", t0())
        .await;

    assert_eq!(outcome.label(), "admitted");
    assert_eq!(outcome.zone(), Some(&zone("test.ir")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submitters_admit_once() {
    let h = harness(10);
    let pipeline = Arc::new(h.pipeline);

    let tasks = (0..16).map(|i| {
        let pipeline = pipeline.clone();
        tokio::spawn(async move {
            pipeline
                .ingest(
                    &CallContext::background(),
                    &Identity::from(format!("user-{i}")),
                    "https://news.shared.com",
                    t0(),
                )
                .await
        })
    });
    let outcomes: Vec<Outcome> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(outcomes.iter().filter(|o| o.is_admitted()).count(), 1);
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Duplicate(_)))
            .count(),
        15
    );
    assert_eq!(h.store.len(), 1);
}
