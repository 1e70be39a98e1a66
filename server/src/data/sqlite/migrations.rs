//! Schema migrations
//!
//! A fresh database gets the full `SCHEMA` at `SCHEMA_VERSION`. An existing
//! one replays every step in `MIGRATIONS` newer than its recorded version.
//! Each applied step is logged in `schema_migrations` with its checksum.

use std::time::Instant;

use sqlx::{Sqlite, SqlitePool, Transaction};

use super::error::SqliteError;
use super::schema::{SCHEMA, SCHEMA_VERSION};
use crate::utils::checksum::sha256_hex;

struct Migration {
    version: i32,
    name: &'static str,
    sql: &'static str,
}

/// Incremental steps, ascending. Version 1 is the initial schema itself.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 2,
    name: "add_entities_parent_index",
    sql: "CREATE INDEX IF NOT EXISTS idx_entities_parent ON entities(parent_path, kind)",
}];

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteError> {
    let initialized: bool = sqlx::query_scalar(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
    )
    .fetch_one(pool)
    .await?;

    if !initialized {
        return apply_initial_schema(pool).await;
    }

    let current: i32 = sqlx::query_scalar("SELECT version FROM schema_version WHERE id = 1")
        .fetch_optional(pool)
        .await?
        .unwrap_or(0);

    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();
    if pending.is_empty() {
        tracing::debug!(version = current, "Schema up to date");
        return Ok(());
    }
    for migration in pending {
        apply_migration(pool, migration).await?;
    }
    Ok(())
}

async fn apply_initial_schema(pool: &SqlitePool) -> Result<(), SqliteError> {
    let started = Instant::now();
    let mut tx = pool.begin().await?;
    sqlx::query(SCHEMA).execute(&mut *tx).await?;
    sqlx::query(
        "INSERT INTO schema_version (id, version, applied_at, description) VALUES (1, ?, ?, 'Initial schema')",
    )
    .bind(SCHEMA_VERSION)
    .bind(now_nanos())
    .execute(&mut *tx)
    .await?;
    record(&mut tx, SCHEMA_VERSION, "initial_schema", SCHEMA, started).await?;
    tx.commit().await?;

    tracing::debug!(version = SCHEMA_VERSION, "Created schema");
    Ok(())
}

async fn apply_migration(pool: &SqlitePool, migration: &Migration) -> Result<(), SqliteError> {
    let started = Instant::now();
    let mut tx = pool.begin().await?;

    for statement in migration.sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| SqliteError::MigrationFailed {
                version: migration.version,
                name: migration.name.to_string(),
                error: format!("{} ({})", e, &statement[..statement.len().min(50)]),
            })?;
    }

    sqlx::query(
        "UPDATE schema_version SET version = ?, applied_at = ?, description = ? WHERE id = 1",
    )
    .bind(migration.version)
    .bind(now_nanos())
    .bind(migration.name)
    .execute(&mut *tx)
    .await?;
    record(&mut tx, migration.version, migration.name, migration.sql, started).await?;
    tx.commit().await?;

    tracing::debug!(version = migration.version, name = migration.name, "Applied migration");
    Ok(())
}

async fn record(
    tx: &mut Transaction<'_, Sqlite>,
    version: i32,
    name: &str,
    sql: &str,
    started: Instant,
) -> Result<(), SqliteError> {
    sqlx::query(
        "INSERT INTO schema_migrations (version, name, applied_at, checksum, execution_time_ms, success) VALUES (?, ?, ?, ?, ?, 1)",
    )
    .bind(version)
    .bind(name)
    .bind(now_nanos())
    .bind(sha256_hex(sql))
    .bind(started.elapsed().as_millis() as i64)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn now_nanos() -> i64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0)
}
