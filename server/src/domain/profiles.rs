//! User profiles

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use super::error::ServiceError;
use crate::data::keys::{EntityKey, Kind};
use crate::data::traits::DocumentStore;
use crate::data::types::{Keyed, Profile, TeeShirtSize};

/// Authenticated caller as seen by the services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
        }
    }

    pub fn profile_key(&self) -> EntityKey {
        EntityKey::with_name(Kind::Profile, &self.user_id)
    }

    /// Local part of the email, used as the initial display name
    pub fn nickname(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub display_name: Option<String>,
    pub tee_shirt_size: Option<TeeShirtSize>,
}

pub struct ProfileService {
    store: Arc<dyn DocumentStore>,
    /// Held across every read-modify-write of a profile, and of the
    /// conferences whose seats follow profile registrations
    writes: Mutex<()>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            writes: Mutex::new(()),
        }
    }

    pub(crate) async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().await
    }

    /// Load the caller's profile, creating it on first access
    pub async fn get_profile(&self, identity: &Identity) -> Result<Keyed<Profile>, ServiceError> {
        if let Some(doc) = self.store.get(&identity.profile_key()).await? {
            return Ok(Keyed::from_document(&doc)?);
        }
        let _guard = self.lock_writes().await;
        self.load_or_create(identity).await
    }

    /// Like `get_profile`, for callers already holding `lock_writes`
    pub(crate) async fn load_or_create(
        &self,
        identity: &Identity,
    ) -> Result<Keyed<Profile>, ServiceError> {
        let key = identity.profile_key();
        if let Some(doc) = self.store.get(&key).await? {
            return Ok(Keyed::from_document(&doc)?);
        }

        let profile = Keyed {
            key,
            entity: Profile {
                display_name: identity.nickname().to_string(),
                main_email: identity.email.clone(),
                tee_shirt_size: TeeShirtSize::NotSpecified,
                conference_keys_to_attend: Vec::new(),
            },
        };
        self.store.put(&profile.to_document()?).await?;
        tracing::debug!(user_id = %identity.user_id, "Created profile");
        Ok(profile)
    }

    pub async fn save_profile(
        &self,
        identity: &Identity,
        form: ProfileForm,
    ) -> Result<Keyed<Profile>, ServiceError> {
        let _guard = self.lock_writes().await;
        let mut profile = self.load_or_create(identity).await?;
        if let Some(name) = form.display_name.filter(|n| !n.trim().is_empty()) {
            profile.entity.display_name = name;
        }
        if let Some(size) = form.tee_shirt_size {
            profile.entity.tee_shirt_size = size;
        }
        self.store.put(&profile.to_document()?).await?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SqliteService;

    async fn service() -> ProfileService {
        ProfileService::new(Arc::new(SqliteService::in_memory().await))
    }

    #[tokio::test]
    async fn test_profile_created_from_identity() {
        let profiles = service().await;
        let ada = Identity::new("u1", "ada@example.com");

        let profile = profiles.get_profile(&ada).await.unwrap();
        assert_eq!(profile.key, ada.profile_key());
        assert_eq!(profile.entity.display_name, "ada");
        assert_eq!(profile.entity.main_email, "ada@example.com");
        assert_eq!(profile.entity.tee_shirt_size, TeeShirtSize::NotSpecified);

        // Second access loads the stored copy
        assert_eq!(profiles.get_profile(&ada).await.unwrap(), profile);
    }

    #[tokio::test]
    async fn test_save_profile_overwrites_given_fields() {
        let profiles = service().await;
        let ada = Identity::new("u1", "ada@example.com");

        let saved = profiles
            .save_profile(
                &ada,
                ProfileForm {
                    display_name: Some("Ada L.".into()),
                    tee_shirt_size: Some(TeeShirtSize::MW),
                },
            )
            .await
            .unwrap();
        assert_eq!(saved.entity.display_name, "Ada L.");

        let kept = profiles
            .save_profile(
                &ada,
                ProfileForm {
                    display_name: Some("  ".into()),
                    tee_shirt_size: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(kept.entity.display_name, "Ada L.");
        assert_eq!(kept.entity.tee_shirt_size, TeeShirtSize::MW);
    }
}
