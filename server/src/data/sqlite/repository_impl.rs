//! DocumentStore trait implementation for SQLite
//!
//! This module implements the DocumentStore trait for SqliteService by
//! delegating to the entity repository functions.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::keys::{EntityKey, KeyId, Kind};
use crate::data::traits::DocumentStore;
use crate::data::types::{Document, Query};

use super::SqliteService;
use super::repositories::entities;

#[async_trait]
impl DocumentStore for SqliteService {
    async fn allocate_key(
        &self,
        kind: Kind,
        parent: Option<&EntityKey>,
    ) -> Result<EntityKey, DataError> {
        let id = entities::allocate_id(self.pool(), kind, parent).await?;
        Ok(match parent {
            Some(p) => p.child(kind, KeyId::Id(id)),
            None => EntityKey::with_id(kind, id),
        })
    }

    async fn put(&self, doc: &Document) -> Result<(), DataError> {
        entities::put_documents(self.pool(), std::slice::from_ref(doc))
            .await
            .map_err(Into::into)
    }

    async fn put_multi(&self, docs: &[Document]) -> Result<(), DataError> {
        entities::put_documents(self.pool(), docs)
            .await
            .map_err(Into::into)
    }

    async fn delete(&self, key: &EntityKey) -> Result<bool, DataError> {
        entities::delete_document(self.pool(), key)
            .await
            .map_err(Into::into)
    }

    async fn get(&self, key: &EntityKey) -> Result<Option<Document>, DataError> {
        entities::get_document(self.pool(), key)
            .await
            .map_err(Into::into)
    }

    async fn get_multi(&self, keys: &[EntityKey]) -> Result<Vec<Option<Document>>, DataError> {
        entities::get_documents(self.pool(), keys)
            .await
            .map_err(Into::into)
    }

    async fn run_query(&self, query: &Query) -> Result<Vec<Document>, DataError> {
        entities::query_documents(self.pool(), query)
            .await
            .map_err(Into::into)
    }
}
