//! # SQLite Storage Adapter
//!
//! Production implementation of [`AttemptLedger`] and [`DomainStore`] over a
//! single SQLite file.
//!
//! ## Features
//!
//! - WAL journal and `synchronous = NORMAL`
//! - Busy timeout so concurrent writers on the same file wait instead of failing
//! - Catalog uniqueness enforced by `PRIMARY KEY (apex_zone)`
//! - Timestamps stored as Unix milliseconds
//!
//! ## Threading
//!
//! Each store owns one connection behind a mutex. Statements run on the
//! blocking pool. A call whose context expires while it is still queued
//! behind the mutex is abandoned and never touches the database; a statement
//! that already started runs to completion and its result is discarded.

use async_trait::async_trait;
use di_01_rate_limiter::AttemptLedger;
use di_02_domain_catalog::{ApexZone, DomainEntry, DomainStore};
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OpenFlags, OptionalExtension};
use shared_types::{
    timestamp_from_millis, timestamp_to_millis, CallContext, Identity, StorageError, Timestamp,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::schema;

const PENDING: u8 = 0;
const RUNNING: u8 = 1;
const ABANDONED: u8 = 2;

/// SQLite configuration.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Path to the database file
    pub path: PathBuf,
    /// How long a writer waits for a competing lock (default: 5s)
    pub busy_timeout: Duration,
    /// Use the write-ahead log (default: true)
    pub wal: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("domains.db"),
            busy_timeout: Duration::from_millis(5_000),
            wal: true,
        }
    }
}

impl SqliteConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Create config for testing (short busy timeout)
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Duration::from_millis(1_000),
            wal: true,
        }
    }
}

/// SQLite-backed attempt ledger and domain store.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    config: SqliteConfig,
}

impl SqliteStore {
    /// Open or create the database file. Does not create tables.
    pub fn open(config: SqliteConfig) -> Result<Self, StorageError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let conn = Connection::open_with_flags(&config.path, flags)
            .map_err(|e| map_sqlite_error("open", e))?;
        apply_pragmas(&conn, &config)?;

        debug!(path = %config.path.display(), "Opened SQLite database");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config,
        })
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Bring the schema up to date. Returns the versions applied.
    pub async fn migrate(&self, ctx: &CallContext) -> Result<Vec<i64>, StorageError> {
        let applied = self.run(ctx, "apply_migrations", schema::apply_migrations).await?;
        if applied.is_empty() {
            debug!("Schema already up to date");
        } else {
            info!(?applied, "Schema migrated");
        }
        Ok(applied)
    }

    /// Run `work` on the blocking pool under `ctx`.
    async fn run<T, F>(
        &self,
        ctx: &CallContext,
        operation: &'static str,
        work: F,
    ) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StorageError> + Send + 'static,
    {
        ctx.check()?;

        let gate = Arc::new(AtomicU8::new(PENDING));
        let task_gate = Arc::clone(&gate);
        let conn = Arc::clone(&self.conn);

        let task = tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock();
            if task_gate
                .compare_exchange(PENDING, RUNNING, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return Err(StorageError::Cancelled);
            }
            work(&mut *conn)
        });

        match ctx.guard(task).await {
            Ok(joined) => joined.map_err(|e| {
                StorageError::io(operation, format!("blocking task failed: {e}"))
            })?,
            Err(interrupted) => {
                let abandoned = gate
                    .compare_exchange(PENDING, ABANDONED, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok();
                if abandoned {
                    debug!(operation, error = %interrupted, "Storage call abandoned before it started");
                } else {
                    warn!(
                        operation,
                        error = %interrupted,
                        "Storage call interrupted while running; result discarded"
                    );
                }
                Err(interrupted)
            }
        }
    }
}

fn apply_pragmas(conn: &Connection, config: &SqliteConfig) -> Result<(), StorageError> {
    conn.pragma_update(None, "foreign_keys", true)
        .map_err(|e| map_sqlite_error("open", e))?;
    if config.wal {
        let mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(|e| map_sqlite_error("open", e))?;
        if !mode.eq_ignore_ascii_case("wal") {
            warn!(mode = %mode, "SQLite refused WAL journal mode");
        }
    }
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(|e| map_sqlite_error("open", e))?;
    conn.busy_timeout(config.busy_timeout)
        .map_err(|e| map_sqlite_error("open", e))?;
    Ok(())
}

/// Map a rusqlite error onto the storage taxonomy.
pub(crate) fn map_sqlite_error(operation: &'static str, err: rusqlite::Error) -> StorageError {
    if let rusqlite::Error::SqliteFailure(code, message) = &err {
        let message = message.clone().unwrap_or_else(|| err.to_string());
        if let Some(table) = message.strip_prefix("no such table: ") {
            return StorageError::MissingTable {
                table: table.to_string(),
            };
        }
        if code.code == ErrorCode::ConstraintViolation {
            return StorageError::Constraint { operation, message };
        }
        return StorageError::Io { operation, message };
    }
    StorageError::io(operation, err.to_string())
}

fn corrupt(table: &'static str, message: impl Into<String>) -> StorageError {
    StorageError::Corrupt {
        table,
        message: message.into(),
    }
}

#[async_trait]
impl AttemptLedger for SqliteStore {
    async fn record_attempt(
        &self,
        ctx: &CallContext,
        identity: &Identity,
        now: Timestamp,
    ) -> Result<(), StorageError> {
        let identity = identity.as_str().to_string();
        let occurred_at = timestamp_to_millis(now);
        self.run(ctx, "record_attempt", move |conn| {
            conn.prepare_cached("INSERT INTO attempts (identity, occurred_at) VALUES (?1, ?2)")
                .and_then(|mut stmt| stmt.execute(params![identity, occurred_at]))
                .map(|_| ())
                .map_err(|e| map_sqlite_error("record_attempt", e))
        })
        .await
    }

    async fn count_attempts(
        &self,
        ctx: &CallContext,
        identity: &Identity,
        since: Timestamp,
    ) -> Result<u64, StorageError> {
        let identity = identity.as_str().to_string();
        let since = timestamp_to_millis(since);
        let count: i64 = self
            .run(ctx, "count_attempts", move |conn| {
                conn.prepare_cached(
                    "SELECT COUNT(*) FROM attempts WHERE identity = ?1 AND occurred_at >= ?2",
                )
                .and_then(|mut stmt| stmt.query_row(params![identity, since], |row| row.get(0)))
                .map_err(|e| map_sqlite_error("count_attempts", e))
            })
            .await?;
        u64::try_from(count).map_err(|_| corrupt("attempts", format!("negative count {count}")))
    }

    async fn prune_before(
        &self,
        ctx: &CallContext,
        cutoff: Timestamp,
    ) -> Result<u64, StorageError> {
        let cutoff = timestamp_to_millis(cutoff);
        let removed = self
            .run(ctx, "prune_before", move |conn| {
                conn.prepare_cached("DELETE FROM attempts WHERE occurred_at < ?1")
                    .and_then(|mut stmt| stmt.execute(params![cutoff]))
                    .map_err(|e| map_sqlite_error("prune_before", e))
            })
            .await?;
        Ok(removed as u64)
    }
}

#[async_trait]
impl DomainStore for SqliteStore {
    async fn insert_if_absent(
        &self,
        ctx: &CallContext,
        zone: &ApexZone,
        now: Timestamp,
    ) -> Result<bool, StorageError> {
        let zone = zone.as_str().to_string();
        let first_seen_at = timestamp_to_millis(now);
        let changed = self
            .run(ctx, "insert_if_absent", move |conn| {
                conn.prepare_cached(
                    "INSERT INTO domains (apex_zone, first_seen_at) VALUES (?1, ?2)
                     ON CONFLICT(apex_zone) DO NOTHING",
                )
                .and_then(|mut stmt| stmt.execute(params![zone, first_seen_at]))
                .map_err(|e| map_sqlite_error("insert_if_absent", e))
            })
            .await?;
        Ok(changed == 1)
    }

    async fn find(
        &self,
        ctx: &CallContext,
        zone: &ApexZone,
    ) -> Result<Option<DomainEntry>, StorageError> {
        let key = zone.as_str().to_string();
        let row: Option<(String, i64)> = self
            .run(ctx, "find", move |conn| {
                conn.prepare_cached(
                    "SELECT apex_zone, first_seen_at FROM domains WHERE apex_zone = ?1",
                )
                .and_then(|mut stmt| {
                    stmt.query_row(params![key], |row| Ok((row.get(0)?, row.get(1)?)))
                        .optional()
                })
                .map_err(|e| map_sqlite_error("find", e))
            })
            .await?;

        let Some((stored_zone, millis)) = row else {
            return Ok(None);
        };
        let apex_zone =
            ApexZone::parse(&stored_zone).map_err(|e| corrupt("domains", e.to_string()))?;
        let first_seen_at = timestamp_from_millis(millis)
            .ok_or_else(|| corrupt("domains", format!("timestamp {millis} out of range")))?;
        Ok(Some(DomainEntry {
            apex_zone,
            first_seen_at,
        }))
    }

    async fn count(&self, ctx: &CallContext) -> Result<u64, StorageError> {
        let count: i64 = self
            .run(ctx, "count_domains", |conn| {
                conn.query_row("SELECT COUNT(*) FROM domains", [], |row| row.get(0))
                    .map_err(|e| map_sqlite_error("count_domains", e))
            })
            .await?;
        u64::try_from(count).map_err(|_| corrupt("domains", format!("negative count {count}")))
    }
}
