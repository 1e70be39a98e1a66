//! Per-user session wishlist

use std::sync::Arc;

use tokio::sync::Mutex;

use super::error::ServiceError;
use super::lookup::{decode_key, from_documents, load, load_many};
use super::profiles::Identity;
use crate::data::keys::Kind;
use crate::data::traits::DocumentStore;
use crate::data::types::{Keyed, Query, Session, Wishlist};

pub struct WishlistService {
    store: Arc<dyn DocumentStore>,
    /// Held across wishlist creation and every add/delete
    writes: Mutex<()>,
}

impl WishlistService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            writes: Mutex::new(()),
        }
    }

    /// The caller's wishlist, created empty on first access
    async fn wishlist(&self, identity: &Identity) -> Result<Keyed<Wishlist>, ServiceError> {
        let query = Query::new(Kind::Wishlist).ancestor(identity.profile_key());
        let docs = self.store.run_query(&query).await?;
        if let Some(existing) = from_documents::<Wishlist>(&docs)?.into_iter().next() {
            return Ok(existing);
        }

        let wishlist = Keyed {
            key: self
                .store
                .allocate_key(Kind::Wishlist, Some(&identity.profile_key()))
                .await?,
            entity: Wishlist::default(),
        };
        self.store.put(&wishlist.to_document()?).await?;
        tracing::debug!(user_id = %identity.user_id, "Created wishlist");
        Ok(wishlist)
    }

    /// Returns the updated list of session keys
    pub async fn add_session_to_wishlist(
        &self,
        identity: &Identity,
        session_key: &str,
    ) -> Result<Vec<String>, ServiceError> {
        let session: Keyed<Session> = load(self.store.as_ref(), session_key, Kind::Session).await?;
        let websafe = session.key.to_websafe();

        let _guard = self.writes.lock().await;
        let mut wishlist = self.wishlist(identity).await?;
        if wishlist.entity.session_keys.contains(&websafe) {
            return Err(ServiceError::conflict("Session is already in your wishlist"));
        }
        wishlist.entity.session_keys.push(websafe);
        self.store.put(&wishlist.to_document()?).await?;
        Ok(wishlist.entity.session_keys)
    }

    pub async fn delete_session_in_wishlist(
        &self,
        identity: &Identity,
        session_key: &str,
    ) -> Result<Vec<String>, ServiceError> {
        let websafe = decode_key(session_key, Kind::Session)?.to_websafe();

        let _guard = self.writes.lock().await;
        let mut wishlist = self.wishlist(identity).await?;
        let before = wishlist.entity.session_keys.len();
        wishlist.entity.session_keys.retain(|k| *k != websafe);
        if wishlist.entity.session_keys.len() == before {
            return Err(ServiceError::conflict("Session is not in your wishlist"));
        }
        self.store.put(&wishlist.to_document()?).await?;
        Ok(wishlist.entity.session_keys)
    }

    /// Sessions on the wishlist; deleted sessions are skipped
    pub async fn get_sessions_in_wishlist(
        &self,
        identity: &Identity,
    ) -> Result<Vec<Keyed<Session>>, ServiceError> {
        let wishlist = {
            let _guard = self.writes.lock().await;
            self.wishlist(identity).await?
        };
        load_many(self.store.as_ref(), &wishlist.entity.session_keys, Kind::Session).await
    }
}
