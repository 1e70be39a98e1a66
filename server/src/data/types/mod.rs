//! Shared data types
//!
//! Store-level types (`Document`, `Query`) and the persisted conference
//! entities that live inside document bodies.

mod document;
mod entities;
mod query;

pub use document::{Document, Keyed};

pub use entities::{Conference, Profile, Session, SessionType, Speaker, TeeShirtSize, Wishlist};

pub use query::{Comparison, PropertyFilter, PropertyValue, Query};
