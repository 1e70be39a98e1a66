//! Speakers and the featured speaker announcement

use std::sync::Arc;

use tokio::sync::Mutex;

use super::error::ServiceError;
use super::lookup::{decode_key, from_documents, load, load_many};
use crate::data::cache::{CacheKey, CacheService};
use crate::data::keys::Kind;
use crate::data::traits::DocumentStore;
use crate::data::types::{Comparison, Keyed, PropertyValue, Query, Session, Speaker};

#[derive(Debug, Clone, Default)]
pub struct SpeakerForm {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub struct SpeakerService {
    store: Arc<dyn DocumentStore>,
    cache: Arc<CacheService>,
    /// Held across the email uniqueness check and the insert
    creating: Mutex<()>,
}

impl SpeakerService {
    pub fn new(store: Arc<dyn DocumentStore>, cache: Arc<CacheService>) -> Self {
        Self {
            store,
            cache,
            creating: Mutex::new(()),
        }
    }

    pub async fn create_speaker(&self, form: SpeakerForm) -> Result<Keyed<Speaker>, ServiceError> {
        let name = non_empty(form.name)
            .ok_or_else(|| ServiceError::bad_request("Speaker 'name' field required"))?;
        let email = non_empty(form.email)
            .ok_or_else(|| ServiceError::bad_request("Speaker 'email' field required"))?;

        let _guard = self.creating.lock().await;
        let existing = self
            .store
            .run_query(&Query::new(Kind::Speaker).filter(
                "email",
                Comparison::Eq,
                PropertyValue::Text(email.clone()),
            ))
            .await?;
        if !existing.is_empty() {
            return Err(ServiceError::conflict(format!(
                "A speaker with email {} already exists",
                email
            )));
        }

        let speaker = Keyed {
            key: self.store.allocate_key(Kind::Speaker, None).await?,
            entity: Speaker { name, email },
        };
        self.store.put(&speaker.to_document()?).await?;
        tracing::debug!(key = %speaker.key, "Created speaker");
        Ok(speaker)
    }

    pub async fn get_speakers(&self) -> Result<Vec<Keyed<Speaker>>, ServiceError> {
        let docs = self.store.run_query(&Query::new(Kind::Speaker)).await?;
        from_documents(&docs)
    }

    /// Distinct speakers of a conference's sessions, in session order
    pub async fn get_conference_speakers(
        &self,
        conference_key: &str,
    ) -> Result<Vec<Keyed<Speaker>>, ServiceError> {
        let conference = decode_key(conference_key, Kind::Conference)?;
        let docs = self
            .store
            .run_query(&Query::new(Kind::Session).ancestor(conference))
            .await?;

        let mut speaker_keys: Vec<String> = Vec::new();
        for session in from_documents::<Session>(&docs)? {
            if let Some(key) = session.entity.speaker_key
                && !speaker_keys.contains(&key)
            {
                speaker_keys.push(key);
            }
        }
        load_many(self.store.as_ref(), &speaker_keys, Kind::Speaker).await
    }

    /// Current featured speaker announcement, empty when none is cached
    pub async fn get_featured_speaker(&self) -> Result<String, ServiceError> {
        Ok(self
            .cache
            .get::<String>(&CacheKey::featured_speaker())
            .await?
            .unwrap_or_default())
    }

    /// Recompute and cache the announcement for `speaker_key` at `conference_key`
    pub async fn set_featured_speaker(
        &self,
        speaker_key: &str,
        conference_key: &str,
    ) -> Result<String, ServiceError> {
        let speaker: Keyed<Speaker> = load(self.store.as_ref(), speaker_key, Kind::Speaker).await?;
        let conference = decode_key(conference_key, Kind::Conference)?;

        let docs = self
            .store
            .run_query(&Query::new(Kind::Session).ancestor(conference).filter(
                "speakerKey",
                Comparison::Eq,
                PropertyValue::Text(speaker_key.to_string()),
            ))
            .await?;
        let sessions: Vec<String> = from_documents::<Session>(&docs)?
            .into_iter()
            .map(|s| s.entity.name)
            .collect();

        let text = featured_speaker_text(&speaker.entity.name, &sessions);
        self.cache
            .set(&CacheKey::featured_speaker(), &text)
            .await?;
        tracing::debug!(speaker = %speaker.entity.name, sessions = sessions.len(), "Featured speaker updated");
        Ok(text)
    }
}

/// A speaker is featured when they have more than one session at a conference
pub fn featured_speaker_text(name: &str, sessions: &[String]) -> String {
    if sessions.len() <= 1 {
        return "Not a featured speaker...".to_string();
    }
    let mut text = format!("Featured speaker: {}\nSessions:", name);
    for session in sessions {
        text.push_str("\n- ");
        text.push_str(session);
    }
    text
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{CacheConfig, EvictionPolicy};
    use crate::data::SqliteService;
    use crate::data::keys::{EntityKey, KeyId};
    use crate::data::types::Document;

    async fn service() -> (SpeakerService, Arc<SqliteService>) {
        let store = Arc::new(SqliteService::in_memory().await);
        let cache = CacheService::new(&CacheConfig {
            max_entries: 100,
            eviction_policy: EvictionPolicy::TinyLfu,
        })
        .unwrap();
        (SpeakerService::new(store.clone(), Arc::new(cache)), store)
    }

    fn form(name: &str, email: &str) -> SpeakerForm {
        SpeakerForm {
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }

    async fn add_session(store: &SqliteService, conference: &EntityKey, id: i64, name: &str, speaker: &str) {
        let session = Session {
            name: name.into(),
            type_of_session: Default::default(),
            speaker_key: Some(speaker.into()),
            highlights: vec![],
            date: None,
            location: None,
            start_time: None,
            duration: None,
        };
        let key = conference.child(Kind::Session, KeyId::Id(id));
        store.put(&Document::from_entity(key, &session).unwrap()).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_creates_keep_email_unique() {
        let (speakers, _) = service().await;
        let (first, second) = tokio::join!(
            speakers.create_speaker(form("Ada", "ada@example.com")),
            speakers.create_speaker(form("Ada L.", "ada@example.com")),
        );

        assert_eq!(
            [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
            1
        );
        let err = first.err().or(second.err()).unwrap();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(speakers.get_speakers().await.unwrap().len(), 1);
    }

    #[test]
    fn test_featured_speaker_text() {
        assert_eq!(
            featured_speaker_text("Ada", &["Async Rust".into(), "Pinning".into()]),
            "Featured speaker: Ada\nSessions:\n- Async Rust\n- Pinning"
        );
        assert_eq!(
            featured_speaker_text("Ada", &["Async Rust".into()]),
            "Not a featured speaker..."
        );
    }

    #[tokio::test]
    async fn test_create_speaker_requires_name_and_email() {
        let (speakers, _) = service().await;
        let err = speakers
            .create_speaker(SpeakerForm {
                name: Some("Ada".into()),
                email: Some(" ".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));

        let err = speakers
            .create_speaker(SpeakerForm {
                name: None,
                email: Some("ada@example.com".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (speakers, _) = service().await;
        speakers.create_speaker(form("Ada", "ada@example.com")).await.unwrap();

        let err = speakers
            .create_speaker(form("Ada Again", "ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(speakers.get_speakers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_featured_speaker_cached() {
        let (speakers, store) = service().await;
        assert_eq!(speakers.get_featured_speaker().await.unwrap(), "");

        let ada = speakers.create_speaker(form("Ada", "ada@example.com")).await.unwrap();
        let ada_key = ada.key.to_websafe();
        let conference = EntityKey::with_name(Kind::Profile, "u1").child(Kind::Conference, KeyId::Id(1));
        add_session(&store, &conference, 1, "Async Rust", &ada_key).await;

        let text = speakers
            .set_featured_speaker(&ada_key, &conference.to_websafe())
            .await
            .unwrap();
        assert_eq!(text, "Not a featured speaker...");

        add_session(&store, &conference, 2, "Pinning", &ada_key).await;
        speakers
            .set_featured_speaker(&ada_key, &conference.to_websafe())
            .await
            .unwrap();
        assert_eq!(
            speakers.get_featured_speaker().await.unwrap(),
            "Featured speaker: Ada\nSessions:\n- Async Rust\n- Pinning"
        );
    }

    #[tokio::test]
    async fn test_conference_speakers_distinct() {
        let (speakers, store) = service().await;
        let ada = speakers.create_speaker(form("Ada", "ada@example.com")).await.unwrap();
        let bob = speakers.create_speaker(form("Bob", "bob@example.com")).await.unwrap();
        let conference = EntityKey::with_name(Kind::Profile, "u1").child(Kind::Conference, KeyId::Id(1));
        add_session(&store, &conference, 1, "One", &bob.key.to_websafe()).await;
        add_session(&store, &conference, 2, "Two", &ada.key.to_websafe()).await;
        add_session(&store, &conference, 3, "Three", &bob.key.to_websafe()).await;

        let found = speakers
            .get_conference_speakers(&conference.to_websafe())
            .await
            .unwrap();
        let names: Vec<_> = found.iter().map(|s| s.entity.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Ada"]);
    }
}
