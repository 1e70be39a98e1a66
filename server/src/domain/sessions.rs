//! Conference sessions

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use super::conferences::ConferenceService;
use super::error::ServiceError;
use super::lookup::{decode_key, from_documents, load};
use super::profiles::Identity;
use super::query::{RawFilter, SESSION_FIELDS, filtered_query};
use super::tasks::{Task, TaskQueue};
use crate::data::keys::Kind;
use crate::data::traits::DocumentStore;
use crate::data::types::{
    Comparison, Keyed, PropertyValue, Query, Session, SessionType, Speaker,
};

/// Client-supplied session fields. `date` is `YYYY-MM-DD`, `start_time` is `HH:MM:SS`.
#[derive(Debug, Clone, Default)]
pub struct SessionForm {
    pub name: Option<String>,
    pub highlights: Vec<String>,
    pub speaker_key: Option<String>,
    pub duration: Option<i64>,
    pub type_of_session: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub location: Option<String>,
}

pub struct SessionService {
    store: Arc<dyn DocumentStore>,
    conferences: Arc<ConferenceService>,
    tasks: TaskQueue,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        conferences: Arc<ConferenceService>,
        tasks: TaskQueue,
    ) -> Self {
        Self {
            store,
            conferences,
            tasks,
        }
    }

    pub async fn create_session(
        &self,
        identity: &Identity,
        conference_key: &str,
        form: SessionForm,
    ) -> Result<Keyed<Session>, ServiceError> {
        let conference = self
            .conferences
            .require_organizer(identity, conference_key)
            .await?;

        let name = form
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ServiceError::bad_request("Session 'name' field required"))?;
        let type_of_session = match form.type_of_session.as_deref() {
            None | Some("") => SessionType::NotSpecified,
            Some(t) => parse_session_type(t)?,
        };
        let date = match form.date.as_deref().filter(|d| !d.is_empty()) {
            Some(d) => Some(NaiveDate::parse_from_str(d, "%Y-%m-%d").map_err(|_| {
                ServiceError::bad_request(format!("Invalid date '{}': expected YYYY-MM-DD", d))
            })?),
            None => None,
        };
        let start_time = match form.start_time.as_deref().filter(|t| !t.is_empty()) {
            Some(t) => Some(NaiveTime::parse_from_str(t, "%H:%M:%S").map_err(|_| {
                ServiceError::bad_request(format!("Invalid time '{}': expected HH:MM:SS", t))
            })?),
            None => None,
        };
        if form.duration.is_some_and(|d| d < 0) {
            return Err(ServiceError::bad_request("duration must not be negative"));
        }

        let speaker_key = match form.speaker_key.filter(|k| !k.is_empty()) {
            Some(key) => {
                let speaker: Keyed<Speaker> = load(self.store.as_ref(), &key, Kind::Speaker).await?;
                Some(speaker.key.to_websafe())
            }
            None => None,
        };

        let id = self
            .store
            .allocate_key(Kind::Session, Some(&conference.key))
            .await?;
        let session = Keyed {
            key: id,
            entity: Session {
                name,
                type_of_session,
                speaker_key: speaker_key.clone(),
                highlights: form.highlights,
                date,
                location: form.location.filter(|l| !l.is_empty()),
                start_time,
                duration: form.duration,
            },
        };
        self.store.put(&session.to_document()?).await?;
        tracing::debug!(key = %session.key, "Created session");

        if let Some(speaker_key) = speaker_key {
            self.tasks
                .enqueue(Task::SetFeaturedSpeaker {
                    speaker_key,
                    conference_key: conference.key.to_websafe(),
                });
        }
        Ok(session)
    }

    pub async fn get_conference_sessions(
        &self,
        conference_key: &str,
    ) -> Result<Vec<Keyed<Session>>, ServiceError> {
        let conference = self.conferences.get_conference(conference_key).await?;
        self.run(Query::new(Kind::Session).ancestor(conference.key))
            .await
    }

    pub async fn get_conference_sessions_by_type(
        &self,
        conference_key: &str,
        type_of_session: &str,
    ) -> Result<Vec<Keyed<Session>>, ServiceError> {
        let session_type = parse_session_type(type_of_session)?;
        let conference = self.conferences.get_conference(conference_key).await?;
        self.run(Query::new(Kind::Session).ancestor(conference.key).filter(
            "typeOfSession",
            Comparison::Eq,
            PropertyValue::Text(session_type.as_str().to_string()),
        ))
        .await
    }

    /// Sessions given by a speaker across all conferences
    pub async fn get_sessions_by_speaker(
        &self,
        speaker_key: &str,
    ) -> Result<Vec<Keyed<Session>>, ServiceError> {
        let speaker: Keyed<Speaker> = load(self.store.as_ref(), speaker_key, Kind::Speaker).await?;
        self.run(Query::new(Kind::Session).filter(
            "speakerKey",
            Comparison::Eq,
            PropertyValue::Text(speaker.key.to_websafe()),
        ))
        .await
    }

    pub async fn get_sessions_by_conference_speaker(
        &self,
        speaker_key: &str,
        conference_key: &str,
    ) -> Result<Vec<Keyed<Session>>, ServiceError> {
        let speaker: Keyed<Speaker> = load(self.store.as_ref(), speaker_key, Kind::Speaker).await?;
        let conference = decode_key(conference_key, Kind::Conference)?;
        self.run(Query::new(Kind::Session).ancestor(conference).filter(
            "speakerKey",
            Comparison::Eq,
            PropertyValue::Text(speaker.key.to_websafe()),
        ))
        .await
    }

    pub async fn query_sessions(
        &self,
        filters: &[RawFilter],
    ) -> Result<Vec<Keyed<Session>>, ServiceError> {
        let docs = filtered_query(
            self.store.as_ref(),
            Query::new(Kind::Session),
            filters,
            SESSION_FIELDS,
        )
        .await?;
        from_documents(&docs)
    }

    pub async fn query_conference_sessions(
        &self,
        conference_key: &str,
        filters: &[RawFilter],
    ) -> Result<Vec<Keyed<Session>>, ServiceError> {
        let conference = self.conferences.get_conference(conference_key).await?;
        let docs = filtered_query(
            self.store.as_ref(),
            Query::new(Kind::Session).ancestor(conference.key),
            filters,
            SESSION_FIELDS,
        )
        .await?;
        from_documents(&docs)
    }

    async fn run(&self, query: Query) -> Result<Vec<Keyed<Session>>, ServiceError> {
        let docs = self.store.run_query(&query).await?;
        from_documents(&docs)
    }
}

fn parse_session_type(value: &str) -> Result<SessionType, ServiceError> {
    SessionType::parse(value)
        .ok_or_else(|| ServiceError::bad_request(format!("Unknown session type: {}", value)))
}
