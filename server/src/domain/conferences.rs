//! Conferences and registration

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};

use super::error::ServiceError;
use super::lookup::{from_documents, load, load_many};
use super::profiles::{Identity, ProfileService};
use super::query::{CONFERENCE_FIELDS, RawFilter, filtered_query};
use super::tasks::{Task, TaskQueue};
use crate::core::constants::{DEFAULT_CONFERENCE_CITY, DEFAULT_CONFERENCE_TOPICS};
use crate::data::keys::Kind;
use crate::data::traits::DocumentStore;
use crate::data::types::{Conference, Keyed, Query};

/// Client-supplied conference fields. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Default)]
pub struct ConferenceForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub topics: Option<Vec<String>>,
    pub city: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub max_attendees: Option<i64>,
}

pub struct ConferenceService {
    store: Arc<dyn DocumentStore>,
    profiles: Arc<ProfileService>,
    tasks: TaskQueue,
}

impl ConferenceService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        profiles: Arc<ProfileService>,
        tasks: TaskQueue,
    ) -> Self {
        Self {
            store,
            profiles,
            tasks,
        }
    }

    pub async fn create_conference(
        &self,
        identity: &Identity,
        form: ConferenceForm,
    ) -> Result<Keyed<Conference>, ServiceError> {
        let name = non_empty(form.name)
            .ok_or_else(|| ServiceError::bad_request("Conference 'name' field required"))?;
        let start_date = parse_date(form.start_date.as_deref())?;
        let end_date = parse_date(form.end_date.as_deref())?;
        let max_attendees = form.max_attendees.unwrap_or(0);
        if max_attendees < 0 {
            return Err(ServiceError::bad_request("maxAttendees must not be negative"));
        }

        let topics = match form.topics {
            Some(topics) if !topics.is_empty() => topics,
            _ => DEFAULT_CONFERENCE_TOPICS
                .iter()
                .map(|t| t.to_string())
                .collect(),
        };

        let profile = self.profiles.get_profile(identity).await?;
        let conference = Keyed {
            key: self
                .store
                .allocate_key(Kind::Conference, Some(&profile.key))
                .await?,
            entity: Conference {
                name,
                description: non_empty(form.description),
                organizer_user_id: identity.user_id.clone(),
                topics,
                city: Some(non_empty(form.city).unwrap_or_else(|| DEFAULT_CONFERENCE_CITY.to_string())),
                start_date,
                month: month_of(start_date),
                end_date,
                max_attendees,
                seats_available: max_attendees,
            },
        };
        self.store.put(&conference.to_document()?).await?;
        tracing::debug!(key = %conference.key, user_id = %identity.user_id, "Created conference");

        self.tasks
            .enqueue(Task::SendConfirmationEmail {
                email: identity.email.clone(),
                conference_info: conference_summary(&conference.entity),
            });
        Ok(conference)
    }

    pub async fn update_conference(
        &self,
        identity: &Identity,
        conference_key: &str,
        form: ConferenceForm,
    ) -> Result<Keyed<Conference>, ServiceError> {
        // Registration rewrites seatsAvailable under the same lock
        let _guard = self.profiles.lock_writes().await;
        let mut conference: Keyed<Conference> =
            load(self.store.as_ref(), conference_key, Kind::Conference).await?;
        if conference.entity.organizer_user_id != identity.user_id {
            return Err(ServiceError::forbidden(
                "Only the owner can update the conference.",
            ));
        }

        let c = &mut conference.entity;
        if let Some(name) = non_empty(form.name) {
            c.name = name;
        }
        if let Some(description) = non_empty(form.description) {
            c.description = Some(description);
        }
        if let Some(topics) = form.topics.filter(|t| !t.is_empty()) {
            c.topics = topics;
        }
        if let Some(city) = non_empty(form.city) {
            c.city = Some(city);
        }
        if let Some(start) = parse_date(form.start_date.as_deref())? {
            c.start_date = Some(start);
            c.month = start.month() as i64;
        }
        if let Some(end) = parse_date(form.end_date.as_deref())? {
            c.end_date = Some(end);
        }
        if let Some(max) = form.max_attendees {
            if max < 0 {
                return Err(ServiceError::bad_request("maxAttendees must not be negative"));
            }
            c.max_attendees = max;
        }

        self.store.put(&conference.to_document()?).await?;
        Ok(conference)
    }

    pub async fn get_conference(&self, conference_key: &str) -> Result<Keyed<Conference>, ServiceError> {
        load(self.store.as_ref(), conference_key, Kind::Conference).await
    }

    /// Conferences organized by the caller
    pub async fn get_conferences_created(
        &self,
        identity: &Identity,
    ) -> Result<Vec<Keyed<Conference>>, ServiceError> {
        let query = Query::new(Kind::Conference).ancestor(identity.profile_key());
        let docs = self.store.run_query(&query).await?;
        from_documents(&docs)
    }

    pub async fn query_conferences(
        &self,
        filters: &[RawFilter],
    ) -> Result<Vec<Keyed<Conference>>, ServiceError> {
        let docs = filtered_query(
            self.store.as_ref(),
            Query::new(Kind::Conference),
            filters,
            CONFERENCE_FIELDS,
        )
        .await?;
        from_documents(&docs)
    }

    pub async fn register_for_conference(
        &self,
        identity: &Identity,
        conference_key: &str,
    ) -> Result<(), ServiceError> {
        let _guard = self.profiles.lock_writes().await;

        let mut profile = self.profiles.load_or_create(identity).await?;
        let mut conference: Keyed<Conference> =
            load(self.store.as_ref(), conference_key, Kind::Conference).await?;
        let websafe = conference.key.to_websafe();

        if profile.entity.conference_keys_to_attend.contains(&websafe) {
            return Err(ServiceError::conflict(
                "You have already registered for this conference",
            ));
        }
        if conference.entity.seats_available <= 0 {
            return Err(ServiceError::conflict("There are no seats available."));
        }

        profile.entity.conference_keys_to_attend.push(websafe);
        conference.entity.seats_available -= 1;
        self.store
            .put_multi(&[profile.to_document()?, conference.to_document()?])
            .await?;
        tracing::debug!(user_id = %identity.user_id, key = %conference.key, "Registered for conference");
        Ok(())
    }

    /// Returns false when the caller was not registered
    pub async fn unregister_from_conference(
        &self,
        identity: &Identity,
        conference_key: &str,
    ) -> Result<bool, ServiceError> {
        let _guard = self.profiles.lock_writes().await;

        let mut profile = self.profiles.load_or_create(identity).await?;
        let mut conference: Keyed<Conference> =
            load(self.store.as_ref(), conference_key, Kind::Conference).await?;
        let websafe = conference.key.to_websafe();

        let before = profile.entity.conference_keys_to_attend.len();
        profile
            .entity
            .conference_keys_to_attend
            .retain(|k| *k != websafe);
        if profile.entity.conference_keys_to_attend.len() == before {
            return Ok(false);
        }

        conference.entity.seats_available += 1;
        self.store
            .put_multi(&[profile.to_document()?, conference.to_document()?])
            .await?;
        Ok(true)
    }

    pub async fn get_conferences_to_attend(
        &self,
        identity: &Identity,
    ) -> Result<Vec<Keyed<Conference>>, ServiceError> {
        let profile = self.profiles.get_profile(identity).await?;
        load_many(
            self.store.as_ref(),
            &profile.entity.conference_keys_to_attend,
            Kind::Conference,
        )
        .await
    }

    /// Resolve a conference key and check the caller organizes it
    pub(crate) async fn require_organizer(
        &self,
        identity: &Identity,
        conference_key: &str,
    ) -> Result<Keyed<Conference>, ServiceError> {
        let conference = self.get_conference(conference_key).await?;
        if conference.entity.organizer_user_id != identity.user_id {
            return Err(ServiceError::forbidden(
                "Only the owner of the conference can add sessions.",
            ));
        }
        Ok(conference)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, ServiceError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ServiceError::bad_request(format!("Invalid date '{}': expected YYYY-MM-DD", v))),
    }
}

fn month_of(date: Option<NaiveDate>) -> i64 {
    date.map(|d| d.month() as i64).unwrap_or(0)
}

fn conference_summary(c: &Conference) -> String {
    let mut lines = vec![format!("Name: {}", c.name)];
    if let Some(description) = &c.description {
        lines.push(format!("Description: {}", description));
    }
    lines.push(format!("Topics: {}", c.topics.join(", ")));
    if let Some(city) = &c.city {
        lines.push(format!("City: {}", city));
    }
    if let Some(start) = c.start_date {
        lines.push(format!("Start date: {}", start));
    }
    if let Some(end) = c.end_date {
        lines.push(format!("End date: {}", end));
    }
    lines.push(format!("Max attendees: {}", c.max_attendees));
    lines.join("\n")
}
