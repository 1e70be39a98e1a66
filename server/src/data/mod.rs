//! Data storage layer
//!
//! Provides database services for the application:
//! - `sqlite` - Embedded document store backend
//! - `keys` - Hierarchical entity keys and their websafe form
//! - `cache` - In-memory look-aside cache for announcements
//! - `types` - Documents, queries and persisted entities
//! - `traits` - The `DocumentStore` seam used by the domain layer
//! - `error` - Unified error type for the data layer

pub mod cache;
pub mod error;
pub mod keys;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteService;

// Re-export unified error type
pub use error::DataError;

// Re-export repository traits
pub use traits::DocumentStore;

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::storage::AppStorage;

/// Datastore service enum
///
/// Wraps the underlying backend-specific service. Services are stored as
/// Arc so the store handle can be shared with the domain layer.
pub enum DatastoreService {
    /// SQLite backend (embedded)
    Sqlite(Arc<SqliteService>),
}

impl DatastoreService {
    /// Initialize the datastore on the local data directory
    pub async fn init(storage: &AppStorage) -> Result<Self, DataError> {
        let service = SqliteService::init(storage).await?;
        Ok(Self::Sqlite(Arc::new(service)))
    }

    /// Run a WAL checkpoint
    pub async fn checkpoint(&self) -> Result<(), DataError> {
        match self {
            Self::Sqlite(s) => s.checkpoint().await.map_err(Into::into),
        }
    }

    /// Close the database connection gracefully
    pub async fn close(&self) {
        match self {
            Self::Sqlite(s) => s.close().await,
        }
    }

    /// Start the background checkpoint task
    pub fn start_checkpoint_task(&self, shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        match self {
            Self::Sqlite(s) => s.start_checkpoint_task(shutdown_rx),
        }
    }

    /// Get the document store handle for domain services
    pub fn store(&self) -> Arc<dyn DocumentStore> {
        match self {
            Self::Sqlite(s) => Arc::clone(s) as Arc<dyn DocumentStore>,
        }
    }
}
