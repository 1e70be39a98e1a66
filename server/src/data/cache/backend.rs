//! Cache backend seam

use async_trait::async_trait;

use super::error::CacheError;

/// Byte-level store behind `CacheService`.
///
/// Announcement texts are the only values held here, and each has exactly
/// one writer (the featured speaker worker or the announcement job), so the
/// contract is plain last-write-wins.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;

    /// Returns whether the key held a value
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    fn backend_name(&self) -> &'static str;
}
