//! SQLite repositories
//!
//! Types (Document, Query, etc.) should be imported from `crate::data::types`.

pub mod entities;

pub use entities::{
    allocate_id, delete_document, get_document, get_documents, put_documents, query_documents,
};
