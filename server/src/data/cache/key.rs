//! Type-safe cache key builder with versioning

use crate::core::constants::{
    ANNOUNCEMENT_CACHE_KEY, CACHE_KEY_VERSION, FEATURED_SPEAKER_CACHE_KEY,
};

/// Type-safe cache key builder
///
/// All keys are prefixed with a version (e.g., "v1:") to allow
/// invalidating all cached data on schema changes.
pub struct CacheKey;

impl CacheKey {
    // =========================================================================
    // Announcements
    // =========================================================================

    /// Featured speaker announcement (single well-known entry)
    pub fn featured_speaker() -> String {
        format!("{}:{}", CACHE_KEY_VERSION, FEATURED_SPEAKER_CACHE_KEY)
    }

    /// Nearly-sold-out conferences announcement
    pub fn announcement() -> String {
        format!("{}:{}", CACHE_KEY_VERSION, ANNOUNCEMENT_CACHE_KEY)
    }
}
