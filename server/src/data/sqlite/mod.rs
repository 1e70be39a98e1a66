//! SQLite document store
//!
//! One `entities` table holds every document as a JSON body keyed by its
//! canonical key path. The pool runs in WAL mode and a background task
//! truncates the WAL periodically.

pub mod error;
mod migrations;
pub mod repositories;
mod repository_impl;
pub mod schema;

pub use error::SqliteError;
pub use sqlx::SqlitePool;

use std::sync::Arc;
use std::time::Duration;

use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::log::LevelFilter;

use crate::core::constants::{
    SQLITE_BUSY_TIMEOUT_SECS, SQLITE_CACHE_SIZE, SQLITE_CHECKPOINT_INTERVAL_SECS,
    SQLITE_MAX_CONNECTIONS, SQLITE_WAL_AUTOCHECKPOINT,
};
use crate::core::storage::AppStorage;

pub struct SqliteService {
    pool: SqlitePool,
}

impl SqliteService {
    /// Open (or create) the database under the data dir and migrate it
    pub async fn init(storage: &AppStorage) -> Result<Self, SqliteError> {
        let db_path = storage.database_path();

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS))
            .pragma("cache_size", SQLITE_CACHE_SIZE)
            .pragma("temp_store", "MEMORY")
            .pragma("wal_autocheckpoint", SQLITE_WAL_AUTOCHECKPOINT);

        let service = Self::connect(options, SQLITE_MAX_CONNECTIONS).await?;
        tracing::debug!(path = %db_path.display(), "SqliteService initialized");
        Ok(service)
    }

    /// Fresh migrated in-memory database for tests.
    ///
    /// A `:memory:` database is private to its connection, so the pool is
    /// capped at one.
    #[cfg(test)]
    pub async fn in_memory() -> Self {
        let options = SqliteConnectOptions::new().in_memory(true);
        Self::connect(options, 1).await.unwrap()
    }

    async fn connect(
        options: SqliteConnectOptions,
        max_connections: u32,
    ) -> Result<Self, SqliteError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options.log_statements(LevelFilter::Trace))
            .await?;
        migrations::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn checkpoint(&self) -> Result<(), SqliteError> {
        sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await?;
        tracing::debug!("WAL checkpoint completed");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("SQLite pool closed");
    }

    /// Truncate the WAL every `SQLITE_CHECKPOINT_INTERVAL_SECS` until shutdown
    pub fn start_checkpoint_task(
        self: &Arc<Self>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let db = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(SQLITE_CHECKPOINT_INTERVAL_SECS));
            // The first tick fires immediately; nothing to checkpoint yet
            interval.tick().await;
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::debug!("WAL checkpoint task shutting down");
                            break;
                        }
                    }
                    _ = interval.tick() => {
                        if let Err(e) = db.checkpoint().await {
                            tracing::warn!(error = %e, "WAL checkpoint failed");
                        }
                    }
                }
            }
        })
    }
}
