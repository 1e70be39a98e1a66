//! Look-aside cache for announcement text
//!
//! Values are MessagePack-encoded behind the `CacheBackend` seam; the moka
//! in-memory backend is the only one shipped.

mod backend;
mod error;
mod key;
mod memory;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use backend::CacheBackend;
pub use error::CacheError;
pub use key::CacheKey;

use memory::MemoryCache;

use crate::core::config::CacheConfig;

/// Typed access to the cache backend
pub struct CacheService {
    backend: Arc<dyn CacheBackend>,
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService")
            .field("backend", &self.backend.backend_name())
            .finish()
    }
}

impl CacheService {
    pub fn new(config: &CacheConfig) -> Result<Self, CacheError> {
        if config.max_entries == 0 {
            return Err(CacheError::Config("max_entries must be positive".into()));
        }
        tracing::debug!(
            max_entries = config.max_entries,
            eviction_policy = ?config.eviction_policy,
            "Initializing in-memory cache"
        );
        Ok(Self {
            backend: Arc::new(MemoryCache::new(config)),
        })
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let Some(bytes) = self.backend.get(key).await? else {
            return Ok(None);
        };
        rmp_serde::from_slice(&bytes)
            .map(Some)
            .map_err(|e| CacheError::Serialization(e.to_string()))
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes =
            rmp_serde::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.backend.set(key, bytes).await
    }

    /// Returns whether the key held a value
    pub async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.backend.delete(key).await
    }
}
