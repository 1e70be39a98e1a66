//! Repository traits for database backends
//!
//! `DocumentStore` is the seam between the domain and persistence: a
//! hierarchical document store with ancestor queries and typed property
//! filters. The SQLite backend implements it; tests use recording fakes.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::keys::{EntityKey, Kind};
use crate::data::types::{Document, Query};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    // ==================== Keys ====================

    /// Allocate a fresh key of `kind` under `parent` with an integer id
    async fn allocate_key(
        &self,
        kind: Kind,
        parent: Option<&EntityKey>,
    ) -> Result<EntityKey, DataError>;

    // ==================== Writes ====================

    /// Insert or replace a document
    async fn put(&self, doc: &Document) -> Result<(), DataError>;

    /// Insert or replace several documents atomically
    async fn put_multi(&self, docs: &[Document]) -> Result<(), DataError>;

    /// Delete a document. Returns true if it existed.
    async fn delete(&self, key: &EntityKey) -> Result<bool, DataError>;

    // ==================== Reads ====================

    async fn get(&self, key: &EntityKey) -> Result<Option<Document>, DataError>;

    /// Batch get aligned with `keys`; missing keys yield `None`
    async fn get_multi(&self, keys: &[EntityKey]) -> Result<Vec<Option<Document>>, DataError>;

    /// Run a query and materialize every match in the store's native order.
    ///
    /// Fails with `DataError::InvalidQuery` when inequality filters span more
    /// than one property.
    async fn run_query(&self, query: &Query) -> Result<Vec<Document>, DataError>;
}
