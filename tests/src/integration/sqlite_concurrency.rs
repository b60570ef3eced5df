//! # SQLite Concurrency
//!
//! Several independent connections against one database file, standing in
//! for several service processes.
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | One winner per zone | `domains.apex_zone` primary key + `ON CONFLICT DO NOTHING` |
//! | No lost attempts | each `record_attempt` is its own insert |
//! | Exact quota (opt-in) | per-identity lock inside one limiter |

#[cfg(test)]
mod tests {
    use super::super::fixtures::{open_store, pipeline, t0, DAY};
    use di_01_rate_limiter::{AttemptLedger, RateLimitPolicy, RateLimiter};
    use di_02_domain_catalog::{ApexZone, DomainStore};
    use di_03_ingestion::Outcome;
    use futures::future::join_all;
    use shared_types::{CallContext, Identity};
    use std::sync::Arc;

    const WRITERS: usize = 8;

    // =========================================================================
    // CATALOG: FIRST WRITER WINS
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_zone_from_many_connections_has_one_winner() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.db");
        let mut stores = Vec::with_capacity(WRITERS);
        for _ in 0..WRITERS {
            stores.push(open_store(&path).await);
        }
        let zone = ApexZone::parse("example.com").unwrap();

        let results = join_all(stores.iter().cloned().map(|store| {
            let zone = zone.clone();
            tokio::spawn(async move {
                store
                    .insert_if_absent(&CallContext::background(), &zone, t0())
                    .await
            })
        }))
        .await;

        let winners = results
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .filter(|created| *created)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(
            DomainStore::count(stores[0].as_ref(), &CallContext::background())
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_pipelines_admit_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipelines.db");
        let mut pipelines = Vec::with_capacity(WRITERS);
        for _ in 0..WRITERS {
            let store = open_store(&path).await;
            pipelines.push(Arc::new(pipeline(
                &store,
                RateLimitPolicy::new(10, DAY).unwrap(),
            )));
        }

        let outcomes = join_all(pipelines.iter().cloned().enumerate().map(|(i, pipeline)| {
            tokio::spawn(async move {
                pipeline
                    .ingest(
                        &CallContext::background(),
                        &Identity::new(format!("user-{i}")),
                        "https://www.shared-target.org/login",
                        t0(),
                    )
                    .await
            })
        }))
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect::<Vec<_>>();

        let admitted = outcomes.iter().filter(|o| o.is_admitted()).count();
        let duplicates = outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Duplicate(_)))
            .count();
        assert_eq!(admitted, 1);
        assert_eq!(duplicates, WRITERS - 1);
    }

    // =========================================================================
    // LEDGER
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_attempts_from_many_connections_are_all_counted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        let mut stores = Vec::with_capacity(WRITERS);
        for _ in 0..WRITERS {
            stores.push(open_store(&path).await);
        }
        let who = Identity::new("U1");

        let results = join_all(stores.iter().cloned().map(|store| {
            let who = who.clone();
            tokio::spawn(async move {
                store
                    .record_attempt(&CallContext::background(), &who, t0())
                    .await
            })
        }))
        .await;
        for joined in results {
            joined.unwrap().unwrap();
        }

        assert_eq!(
            stores[0]
                .count_attempts(&CallContext::background(), &who, t0())
                .await
                .unwrap(),
            WRITERS as u64
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_serialized_limiter_admits_exactly_the_quota() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir.path().join("burst.db")).await;
        let policy = RateLimitPolicy::new(3, DAY)
            .unwrap()
            .serialize_per_identity(true);
        let limiter = Arc::new(RateLimiter::new(store.clone(), policy));
        let who = Identity::new("burst");

        let decisions = join_all((0..10).map(|_| {
            let limiter = limiter.clone();
            let who = who.clone();
            tokio::spawn(async move {
                limiter
                    .can_pass(&CallContext::background(), &who, t0())
                    .await
            })
        }))
        .await;

        let allowed = decisions
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .filter(|decision| decision.is_allowed())
            .count();
        assert_eq!(allowed, 3);
        assert_eq!(
            store
                .count_attempts(&CallContext::background(), &who, t0())
                .await
                .unwrap(),
            10
        );
    }

    #[tokio::test]
    async fn test_prune_is_visible_to_other_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prune.db");
        let writer = open_store(&path).await;
        let sweeper = open_store(&path).await;
        let ctx = CallContext::background();
        let who = Identity::new("U1");
        let old = t0() - chrono::Duration::days(3);

        writer.record_attempt(&ctx, &who, old).await.unwrap();
        writer.record_attempt(&ctx, &who, t0()).await.unwrap();

        let removed = sweeper
            .prune_before(&ctx, t0() - chrono::Duration::days(1))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert_eq!(writer.count_attempts(&ctx, &who, old).await.unwrap(), 1);
    }
}
