//! # Schema Bootstrap
//!
//! Ordered, embedded migrations with a `migrations` bookkeeping table.
//!
//! Each pending version runs in its own `IMMEDIATE` transaction together
//! with its bookkeeping row, so two processes bootstrapping the same file
//! cannot both apply a version.

use rusqlite::{params, Connection, TransactionBehavior};
use shared_types::StorageError;
use tracing::info;

use super::sqlite_adapter::map_sqlite_error;

/// One schema version.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, ascending by version.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create attempts",
        sql: "CREATE TABLE attempts (
                  identity    TEXT    NOT NULL,
                  occurred_at INTEGER NOT NULL
              );
              CREATE INDEX idx_attempts_identity_occurred_at
                  ON attempts (identity, occurred_at);",
    },
    Migration {
        version: 2,
        description: "create domains",
        sql: "CREATE TABLE domains (
                  apex_zone     TEXT    PRIMARY KEY,
                  first_seen_at INTEGER NOT NULL
              );",
    },
];

const CREATE_BOOKKEEPING: &str = "CREATE TABLE IF NOT EXISTS migrations (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    version_id INTEGER NOT NULL,
    is_applied INTEGER NOT NULL,
    tstamp     TIMESTAMP DEFAULT (datetime('now'))
);";

/// Highest applied version, `0` for a fresh database.
pub fn current_version(conn: &Connection) -> Result<i64, StorageError> {
    conn.execute_batch(CREATE_BOOKKEEPING)
        .map_err(|e| map_sqlite_error("current_version", e))?;
    conn.query_row(
        "SELECT COALESCE(MAX(version_id), 0) FROM migrations WHERE is_applied = 1",
        [],
        |row| row.get(0),
    )
    .map_err(|e| map_sqlite_error("current_version", e))
}

/// Apply every migration newer than the current version.
///
/// Returns the versions applied by this call. Idempotent.
pub fn apply_migrations(conn: &mut Connection) -> Result<Vec<i64>, StorageError> {
    apply(conn, MIGRATIONS)
}

pub(crate) fn apply(
    conn: &mut Connection,
    migrations: &[Migration],
) -> Result<Vec<i64>, StorageError> {
    conn.execute_batch(CREATE_BOOKKEEPING)
        .map_err(|e| map_sqlite_error("apply_migrations", e))?;

    let mut applied = Vec::new();
    for migration in migrations {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| map_sqlite_error("apply_migrations", e))?;

        let version: i64 = tx
            .query_row(
                "SELECT COALESCE(MAX(version_id), 0) FROM migrations WHERE is_applied = 1",
                [],
                |row| row.get(0),
            )
            .map_err(|e| map_sqlite_error("apply_migrations", e))?;
        if migration.version <= version {
            continue;
        }

        tx.execute_batch(migration.sql)
            .map_err(|e| map_sqlite_error("apply_migrations", e))?;
        tx.execute(
            "INSERT INTO migrations (version_id, is_applied) VALUES (?1, 1)",
            params![migration.version],
        )
        .map_err(|e| map_sqlite_error("apply_migrations", e))?;
        tx.commit()
            .map_err(|e| map_sqlite_error("apply_migrations", e))?;

        info!(
            version = migration.version,
            description = migration.description,
            "Applied schema migration"
        );
        applied.push(migration.version);
    }
    Ok(applied)
}
