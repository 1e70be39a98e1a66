//! Data layer error type
//!
//! Everything the document store, key codec and document (de)serialization
//! can fail with. Domain services wrap this in `ServiceError`.

use thiserror::Error;

use crate::data::sqlite::SqliteError;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("SQLite error: {0}")]
    Sqlite(sqlx::Error),

    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    /// Malformed entity key (bad websafe encoding, unknown kind, empty path)
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Query rejected by the store before execution
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Document body does not match the entity it is read as
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DataError {
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKey(msg.into())
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Storage backend name for log fields; `None` for caller errors
    pub fn backend(&self) -> Option<&'static str> {
        match self {
            Self::Sqlite(_) | Self::MigrationFailed { .. } => Some("sqlite"),
            Self::InvalidKey(_) | Self::InvalidQuery(_) | Self::Serialization(_) => None,
        }
    }
}

impl From<SqliteError> for DataError {
    fn from(e: SqliteError) -> Self {
        match e {
            SqliteError::Database(e) => Self::Sqlite(e),
            SqliteError::MigrationFailed {
                version,
                name,
                error,
            } => Self::MigrationFailed {
                version,
                name,
                error,
            },
            SqliteError::Json(e) => Self::Serialization(e),
            SqliteError::InvalidKey(msg) => Self::InvalidKey(msg),
            SqliteError::InvalidQuery(msg) => Self::InvalidQuery(msg),
        }
    }
}
