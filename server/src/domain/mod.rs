//! Domain logic for the conference backend
//!
//! - `query` - Multi-filter query engine (parse, partition, push down, evaluate)
//! - `conferences` - Conference CRUD and seat registration
//! - `profiles` - User profiles and the caller identity
//! - `sessions` - Conference sessions and session search
//! - `speakers` - Speakers and the featured speaker announcement
//! - `wishlist` - Per-user session wishlist
//! - `announcements` - Nearly-sold-out announcement
//! - `tasks` - In-process task queue and background jobs

pub mod announcements;
pub mod conferences;
pub mod error;
mod lookup;
pub mod profiles;
pub mod query;
pub mod sessions;
pub mod speakers;
pub mod tasks;
pub mod wishlist;

pub use announcements::AnnouncementService;
pub use conferences::{ConferenceForm, ConferenceService};
pub use error::ServiceError;
pub use profiles::{Identity, ProfileForm, ProfileService};
pub use sessions::{SessionForm, SessionService};
pub use speakers::{SpeakerForm, SpeakerService};
pub use tasks::{Task, TaskQueue};
pub use wishlist::WishlistService;

use std::sync::Arc;

use crate::data::cache::CacheService;
use crate::data::traits::DocumentStore;

/// All domain services, wired over one store and one cache
#[derive(Clone)]
pub struct Services {
    pub profiles: Arc<ProfileService>,
    pub conferences: Arc<ConferenceService>,
    pub sessions: Arc<SessionService>,
    pub speakers: Arc<SpeakerService>,
    pub wishlist: Arc<WishlistService>,
    pub announcements: Arc<AnnouncementService>,
}

impl Services {
    pub fn new(store: Arc<dyn DocumentStore>, cache: Arc<CacheService>, tasks: TaskQueue) -> Self {
        let profiles = Arc::new(ProfileService::new(store.clone()));
        let conferences = Arc::new(ConferenceService::new(
            store.clone(),
            profiles.clone(),
            tasks.clone(),
        ));
        Self {
            sessions: Arc::new(SessionService::new(store.clone(), conferences.clone(), tasks)),
            speakers: Arc::new(SpeakerService::new(store.clone(), cache.clone())),
            wishlist: Arc::new(WishlistService::new(store.clone())),
            announcements: Arc::new(AnnouncementService::new(store, cache)),
            profiles,
            conferences,
        }
    }
}
