//! SQLite error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    #[error("Document body error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored row whose key path no longer parses
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Query shape the store cannot plan
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}
