//! Multi-filter queries
//!
//! Clients filter sessions and conferences with any number of
//! `{field, operator, value}` triples. The document store accepts inequality
//! constraints on one property per query, so filters are split: equality
//! filters and the inequalities of one property are pushed to the store, the
//! rest are evaluated in memory over the store's result.
//!
//! Pipeline: [`parse_filters`] -> [`partition`] -> [`QueryPlan`] -> evaluate.

pub mod error;
pub mod evaluator;
pub mod executor;
pub mod fields;
pub mod parser;
pub mod partition;

pub use error::QueryError;
pub use executor::QueryPlan;
pub use fields::{CONFERENCE_FIELDS, FieldSpec, SESSION_FIELDS};
pub use parser::{RawFilter, parse_filters};
pub use partition::partition;

use crate::data::traits::DocumentStore;
use crate::data::types::{Document, Query};

/// Apply `filters` on top of `base` (kind and optional ancestor).
///
/// Unknown tokens and malformed values are rejected before the store is
/// touched. Results keep the store's native order.
pub async fn filtered_query(
    store: &dyn DocumentStore,
    base: Query,
    filters: &[RawFilter],
    fields: &[FieldSpec],
) -> Result<Vec<Document>, QueryError> {
    let resolved = parse_filters(filters, fields)?;
    let split = partition(resolved);
    QueryPlan::build(base, &split)?.execute(store).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::data::DataError;
    use crate::data::SqliteService;
    use crate::data::keys::{EntityKey, Kind};

    /// Records every query and serves a fixed result set
    #[derive(Default)]
    struct RecordingStore {
        queries: Mutex<Vec<Query>>,
        docs: Vec<Document>,
    }

    impl RecordingStore {
        fn calls(&self) -> usize {
            self.queries.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl DocumentStore for RecordingStore {
        async fn allocate_key(&self, kind: Kind, _parent: Option<&EntityKey>) -> Result<EntityKey, DataError> {
            Ok(EntityKey::with_id(kind, 1))
        }
        async fn put(&self, _doc: &Document) -> Result<(), DataError> {
            Ok(())
        }
        async fn put_multi(&self, _docs: &[Document]) -> Result<(), DataError> {
            Ok(())
        }
        async fn delete(&self, _key: &EntityKey) -> Result<bool, DataError> {
            Ok(false)
        }
        async fn get(&self, _key: &EntityKey) -> Result<Option<Document>, DataError> {
            Ok(None)
        }
        async fn get_multi(&self, keys: &[EntityKey]) -> Result<Vec<Option<Document>>, DataError> {
            Ok(vec![None; keys.len()])
        }
        async fn run_query(&self, query: &Query) -> Result<Vec<Document>, DataError> {
            query.inequality_property()?;
            self.queries.lock().unwrap().push(query.clone());
            Ok(self.docs.clone())
        }
    }

    fn session(id: i64, body: serde_json::Value) -> Document {
        Document::new(EntityKey::with_id(Kind::Session, id), body)
    }

    fn names(docs: &[Document]) -> Vec<&str> {
        docs.iter().filter_map(|d| d.body["name"].as_str()).collect()
    }

    async fn seeded_store() -> SqliteService {
        let store = SqliteService::in_memory().await;
        store
            .put_multi(&[
                session(1, json!({"name": "A", "typeOfSession": "WORKSHOP", "startTime": "10:00:00", "duration": 60})),
                session(2, json!({"name": "B", "typeOfSession": "WORKSHOP", "startTime": "14:00:00", "duration": 120})),
                session(3, json!({"name": "C", "typeOfSession": "LECTURE", "startTime": "15:00:00", "duration": 45})),
                session(4, json!({"name": "D", "typeOfSession": "WORKSHOP"})),
            ])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_workshops_after_noon() {
        let store = seeded_store().await;
        let out = filtered_query(
            &store,
            Query::new(Kind::Session),
            &[
                RawFilter::new("TYPE", "EQ", "WORKSHOP"),
                RawFilter::new("TIME", "GT", "12:00:00"),
            ],
            SESSION_FIELDS,
        )
        .await
        .unwrap();
        assert_eq!(names(&out), vec!["B"]);
    }

    #[tokio::test]
    async fn test_two_inequality_fields_split_across_store_and_memory() {
        let store = seeded_store().await;
        let out = filtered_query(
            &store,
            Query::new(Kind::Session),
            &[
                RawFilter::new("TIME", "GT", "09:00:00"),
                RawFilter::new("DURATION", "LT", "100"),
            ],
            SESSION_FIELDS,
        )
        .await
        .unwrap();
        assert_eq!(names(&out), vec!["A", "C"]);
    }

    async fn sorted_names(store: &SqliteService, filters: &[RawFilter]) -> Vec<String> {
        let out = filtered_query(store, Query::new(Kind::Session), filters, SESSION_FIELDS)
            .await
            .unwrap();
        let mut names: Vec<String> = names(&out).into_iter().map(String::from).collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_ne_on_absent_property_is_order_independent() {
        let store = SqliteService::in_memory().await;
        store
            .put_multi(&[
                session(1, json!({"name": "A", "startTime": "14:00:00", "typeOfSession": "WORKSHOP"})),
                session(2, json!({"name": "B", "startTime": "15:00:00"})),
            ])
            .await
            .unwrap();

        let time = RawFilter::new("TIME", "GT", "12:00:00");
        let not_keynote = RawFilter::new("TYPE", "NE", "KEYNOTE");

        let time_first = sorted_names(&store, &[time.clone(), not_keynote.clone()]).await;
        let type_first = sorted_names(&store, &[not_keynote, time]).await;
        assert_eq!(time_first, vec!["A", "B"]);
        assert_eq!(time_first, type_first);
    }

    #[tokio::test]
    async fn test_every_inequality_order_gives_same_result() {
        let store = SqliteService::in_memory().await;
        store
            .put_multi(&[
                session(1, json!({"name": "A", "typeOfSession": "WORKSHOP", "startTime": "14:00:00", "duration": 60})),
                session(2, json!({"name": "B", "startTime": "15:00:00"})),
                session(3, json!({"name": "C", "typeOfSession": "KEYNOTE", "startTime": "16:00:00", "duration": 30})),
                session(4, json!({"name": "D", "typeOfSession": "LECTURE", "startTime": "11:00:00"})),
                session(5, json!({"name": "E", "typeOfSession": "LECTURE", "startTime": "17:00:00", "duration": "30"})),
            ])
            .await
            .unwrap();

        let filters = [
            RawFilter::new("TIME", "GT", "12:00:00"),
            RawFilter::new("TYPE", "NE", "KEYNOTE"),
            RawFilter::new("DURATION", "NE", "30"),
        ];
        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

        for order in orders {
            let permuted: Vec<RawFilter> = order.iter().map(|&i| filters[i].clone()).collect();
            assert_eq!(
                sorted_names(&store, &permuted).await,
                vec!["A", "B"],
                "order {:?}",
                order
            );
        }
    }

    #[tokio::test]
    async fn test_no_filters_returns_all_of_kind() {
        let store = seeded_store().await;
        let out = filtered_query(&store, Query::new(Kind::Session), &[], SESSION_FIELDS)
            .await
            .unwrap();
        assert_eq!(out.len(), 4);
    }

    #[tokio::test]
    async fn test_invalid_field_never_reaches_store() {
        let store = RecordingStore::default();
        let err = filtered_query(
            &store,
            Query::new(Kind::Session),
            &[RawFilter::new("BOGUS", "EQ", "x")],
            SESSION_FIELDS,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, QueryError::InvalidFilter { .. }));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_deferred_value_never_reaches_store() {
        let store = RecordingStore::default();
        let err = filtered_query(
            &store,
            Query::new(Kind::Session),
            &[
                RawFilter::new("DURATION", "GT", "30"),
                RawFilter::new("TIME", "GT", "12-00"),
            ],
            SESSION_FIELDS,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, QueryError::TypeCoercion { .. }));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_store_sees_single_inequality_property() {
        let store = RecordingStore {
            docs: vec![
                session(1, json!({"name": "A", "startTime": "13:00:00", "date": "2026-05-02"})),
                session(2, json!({"name": "B", "startTime": "13:30:00", "date": "2026-04-01"})),
            ],
            ..Default::default()
        };
        let out = filtered_query(
            &store,
            Query::new(Kind::Session),
            &[
                RawFilter::new("TIME", "GT", "12:00:00"),
                RawFilter::new("DATE", "GTEQ", "2026-05-01"),
                RawFilter::new("TIME", "LT", "18:00:00"),
            ],
            SESSION_FIELDS,
        )
        .await
        .unwrap();

        assert_eq!(names(&out), vec!["A"]);
        assert_eq!(store.calls(), 1);
        let queries = store.queries.lock().unwrap();
        assert_eq!(queries[0].filters.len(), 2);
        assert_eq!(queries[0].inequality_property().unwrap(), Some("startTime"));
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let store = RecordingStore::default();
        let base = Query::new(Kind::Session).filter(
            "date",
            crate::data::types::Comparison::Lt,
            crate::data::types::PropertyValue::Text("2026-01-01".into()),
        );
        let err = filtered_query(
            &store,
            base,
            &[RawFilter::new("TIME", "GT", "12:00:00")],
            SESSION_FIELDS,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, QueryError::Datastore(DataError::InvalidQuery(_))));
    }
}
