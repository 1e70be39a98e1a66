//! moka-backed in-process cache

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::EvictionPolicy as MokaPolicy;

use super::backend::CacheBackend;
use super::error::CacheError;
use crate::core::config::{CacheConfig, EvictionPolicy};

pub struct MemoryCache {
    entries: Cache<String, Arc<[u8]>>,
}

impl MemoryCache {
    pub fn new(config: &CacheConfig) -> Self {
        let policy = match config.eviction_policy {
            EvictionPolicy::TinyLfu => MokaPolicy::tiny_lfu(),
            EvictionPolicy::Lru => MokaPolicy::lru(),
        };
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .eviction_policy(policy)
            .build();
        Self { entries }
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.get(key).await.map(|bytes| bytes.to_vec()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), Arc::from(value)).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.remove(key).await.is_some())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
