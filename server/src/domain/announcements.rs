//! Nearly-sold-out announcement

use std::sync::Arc;

use super::error::ServiceError;
use super::lookup::from_documents;
use crate::core::constants::NEARLY_SOLD_OUT_SEATS;
use crate::data::cache::{CacheKey, CacheService};
use crate::data::keys::Kind;
use crate::data::traits::DocumentStore;
use crate::data::types::{Comparison, Conference, PropertyValue, Query};

pub struct AnnouncementService {
    store: Arc<dyn DocumentStore>,
    cache: Arc<CacheService>,
}

impl AnnouncementService {
    pub fn new(store: Arc<dyn DocumentStore>, cache: Arc<CacheService>) -> Self {
        Self { store, cache }
    }

    /// Rebuild the cached announcement from conferences with few seats left.
    /// Clears it when no conference qualifies.
    pub async fn refresh(&self) -> Result<Option<String>, ServiceError> {
        let query = Query::new(Kind::Conference)
            .filter("seatsAvailable", Comparison::Gt, PropertyValue::Integer(0))
            .filter(
                "seatsAvailable",
                Comparison::Le,
                PropertyValue::Integer(NEARLY_SOLD_OUT_SEATS),
            );
        let docs = self.store.run_query(&query).await?;
        let names: Vec<String> = from_documents::<Conference>(&docs)?
            .into_iter()
            .map(|c| c.entity.name)
            .collect();

        let key = CacheKey::announcement();
        if names.is_empty() {
            self.cache.delete(&key).await?;
            return Ok(None);
        }

        let text = format!(
            "Last chance to attend! The following conferences are nearly sold out: {}",
            names.join(", ")
        );
        self.cache.set(&key, &text).await?;
        tracing::debug!(conferences = names.len(), "Announcement refreshed");
        Ok(Some(text))
    }

    pub async fn get_announcement(&self) -> Result<String, ServiceError> {
        Ok(self
            .cache
            .get::<String>(&CacheKey::announcement())
            .await?
            .unwrap_or_default())
    }
}
