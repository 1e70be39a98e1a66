//! Entity repository for SQLite operations
//!
//! Documents live in the `entities` table as JSON bodies. Property filters
//! compile to `json_each` predicates so scalar and repeated properties share
//! one code path: a repeated property matches when any element matches.

use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::data::keys::{EntityKey, Kind};
use crate::data::sqlite::SqliteError;
use crate::data::types::{Comparison, Document, PropertyFilter, PropertyValue, Query};

/// Bound parameter of a generated statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
}

/// Collects SQL parameters during query building (maintains insertion order)
#[derive(Debug, Default)]
pub struct SqlParams {
    pub values: Vec<SqlValue>,
}

impl SqlParams {
    fn text(&mut self, value: impl Into<String>) {
        self.values.push(SqlValue::Text(value.into()));
    }

    fn integer(&mut self, value: i64) {
        self.values.push(SqlValue::Integer(value));
    }
}

fn json_path(property: &str) -> String {
    format!("$.\"{}\"", property.replace('"', ""))
}

/// Some non-empty value is held: absent, null, "" and [] are all empty
fn present_sql(property: &str, params: &mut SqlParams) -> &'static str {
    params.text(json_path(property));
    "EXISTS (SELECT 1 FROM json_each(e.body, ?) WHERE type <> 'null' AND value <> '')"
}

/// SQL predicate for one property filter.
///
/// Matches the in-memory evaluator record for record: a repeated property
/// matches when any element does, a value of the wrong type never matches,
/// and `!=` keeps records holding no value at all.
fn filter_to_sql(filter: &PropertyFilter, params: &mut SqlParams) -> String {
    if filter.value.is_empty_text() && matches!(filter.op, Comparison::Eq | Comparison::Ne) {
        let present = present_sql(&filter.property, params);
        return match filter.op {
            Comparison::Eq => format!("NOT {}", present),
            _ => present.to_string(),
        };
    }

    let absent = match filter.op {
        Comparison::Ne => Some(format!("NOT {}", present_sql(&filter.property, params))),
        _ => None,
    };

    params.text(json_path(&filter.property));
    let stored_type = match &filter.value {
        PropertyValue::Text(s) => {
            params.text(s.clone());
            "text"
        }
        PropertyValue::Integer(n) => {
            params.integer(*n);
            "integer"
        }
    };
    let compare = format!(
        "EXISTS (SELECT 1 FROM json_each(e.body, ?) WHERE type = '{}' AND value <> '' AND value {} ?)",
        stored_type,
        filter.op.symbol()
    );

    match absent {
        Some(absent) => format!("({} OR {})", absent, compare),
        None => compare,
    }
}

/// Build the SELECT for a query. Rejects inequality filters on more than one property.
pub fn build_query_sql(query: &Query, params: &mut SqlParams) -> Result<String, SqliteError> {
    let inequality_property = query
        .inequality_property()
        .map_err(|e| SqliteError::InvalidQuery(e.to_string()))?;

    let mut conditions = vec!["e.kind = ?".to_string()];
    params.text(query.kind.as_str());

    if let Some(ancestor) = &query.ancestor {
        let path = ancestor.path_string();
        let prefix = format!("{}/", path);
        conditions.push("(e.parent_path = ? OR substr(e.parent_path, 1, ?) = ?)".to_string());
        params.text(path);
        params.integer(prefix.chars().count() as i64);
        params.text(prefix);
    }

    for filter in &query.filters {
        conditions.push(filter_to_sql(filter, params));
    }

    let mut order_by = Vec::new();
    if let Some(property) = inequality_property {
        order_by.push(
            "(SELECT MIN(value) FROM json_each(e.body, ?) WHERE type <> 'null')".to_string(),
        );
        params.text(json_path(property));
    }
    order_by.push("e.parent_path".to_string());
    order_by.push("e.key_id IS NULL".to_string());
    order_by.push("e.key_id".to_string());
    order_by.push("e.key_name".to_string());

    Ok(format!(
        "SELECT e.key_path, e.body FROM entities e WHERE {} ORDER BY {}",
        conditions.join(" AND "),
        order_by.join(", ")
    ))
}

fn row_to_document((key_path, body): (String, String)) -> Result<Document, SqliteError> {
    let key = EntityKey::from_path_string(&key_path)
        .map_err(|e| SqliteError::InvalidKey(format!("stored key {}: {}", key_path, e)))?;
    Ok(Document::new(key, serde_json::from_str(&body)?))
}

/// Allocate the next integer id for `kind` under `parent`
pub async fn allocate_id(
    pool: &SqlitePool,
    kind: Kind,
    parent: Option<&EntityKey>,
) -> Result<i64, SqliteError> {
    let parent_path = parent.map(|p| p.path_string()).unwrap_or_default();

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO id_allocations (kind, parent_path, next_id)
        VALUES (?, ?, 2)
        ON CONFLICT(kind, parent_path) DO UPDATE SET next_id = next_id + 1
        RETURNING next_id - 1
        "#,
    )
    .bind(kind.as_str())
    .bind(parent_path)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Insert or replace documents in a single transaction
pub async fn put_documents(pool: &SqlitePool, docs: &[Document]) -> Result<(), SqliteError> {
    if docs.is_empty() {
        return Ok(());
    }

    let now = chrono::Utc::now().timestamp();
    let mut tx = pool.begin().await?;

    for doc in docs {
        let body = serde_json::to_string(&doc.body)?;
        sqlx::query(
            r#"
            INSERT INTO entities (key_path, kind, parent_path, key_id, key_name, body, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(key_path) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at
            "#,
        )
        .bind(doc.key.path_string())
        .bind(doc.key.kind().as_str())
        .bind(doc.key.parent().map(|p| p.path_string()))
        .bind(doc.key.int_id())
        .bind(doc.key.name())
        .bind(body)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Get a document by key
pub async fn get_document(
    pool: &SqlitePool,
    key: &EntityKey,
) -> Result<Option<Document>, SqliteError> {
    let row: Option<(String, String)> =
        sqlx::query_as("SELECT key_path, body FROM entities WHERE key_path = ?")
            .bind(key.path_string())
            .fetch_optional(pool)
            .await?;

    row.map(row_to_document).transpose()
}

/// Batch get. Output is aligned with `keys`; missing keys yield `None`.
pub async fn get_documents(
    pool: &SqlitePool,
    keys: &[EntityKey],
) -> Result<Vec<Option<Document>>, SqliteError> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    // Build placeholders for IN clause
    let placeholders: String = keys.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let query = format!(
        "SELECT key_path, body FROM entities WHERE key_path IN ({})",
        placeholders
    );

    let mut query_builder = sqlx::query_as::<_, (String, String)>(&query);
    for key in keys {
        query_builder = query_builder.bind(key.path_string());
    }

    let rows = query_builder.fetch_all(pool).await?;
    let mut by_path: HashMap<String, Document> = HashMap::with_capacity(rows.len());
    for row in rows {
        let path = row.0.clone();
        by_path.insert(path, row_to_document(row)?);
    }

    Ok(keys
        .iter()
        .map(|k| by_path.get(&k.path_string()).cloned())
        .collect())
}

/// Delete a document. Returns true if it existed.
pub async fn delete_document(pool: &SqlitePool, key: &EntityKey) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM entities WHERE key_path = ?")
        .bind(key.path_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Run a query, materializing every match in native order
pub async fn query_documents(
    pool: &SqlitePool,
    query: &Query,
) -> Result<Vec<Document>, SqliteError> {
    let mut params = SqlParams::default();
    let sql = build_query_sql(query, &mut params)?;

    let mut query_builder = sqlx::query_as::<_, (String, String)>(&sql);
    for value in params.values {
        query_builder = match value {
            SqlValue::Text(s) => query_builder.bind(s),
            SqlValue::Integer(n) => query_builder.bind(n),
        };
    }

    let rows = query_builder.fetch_all(pool).await?;
    rows.into_iter().map(row_to_document).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::keys::KeyId;
    use crate::data::sqlite::schema::SCHEMA;
    use serde_json::json;

    async fn setup_test_pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        sqlx::query(SCHEMA).execute(&pool).await.unwrap();
        pool
    }

    fn conference_key() -> EntityKey {
        EntityKey::with_name(Kind::Profile, "ada@example.com").child(Kind::Conference, KeyId::Id(1))
    }

    fn session(id: i64, body: serde_json::Value) -> Document {
        Document::new(conference_key().child(Kind::Session, KeyId::Id(id)), body)
    }

    async fn seed_sessions(pool: &SqlitePool) {
        put_documents(
            pool,
            &[
                session(1, json!({"name": "A", "typeOfSession": "WORKSHOP", "startTime": "10:00:00", "duration": 60, "highlights": ["rust"]})),
                session(2, json!({"name": "B", "typeOfSession": "WORKSHOP", "startTime": "14:00:00", "duration": 120, "highlights": []})),
                session(3, json!({"name": "C", "typeOfSession": "LECTURE", "startTime": "15:00:00", "highlights": ["rust", "async"]})),
                session(4, json!({"name": "D", "typeOfSession": "KEYNOTE", "location": ""})),
            ],
        )
        .await
        .unwrap();
    }

    fn names(docs: &[Document]) -> Vec<&str> {
        docs.iter()
            .map(|d| d.body["name"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_allocate_id_is_monotonic_per_parent() {
        let pool = setup_test_pool().await;
        let parent = conference_key();

        assert_eq!(allocate_id(&pool, Kind::Session, Some(&parent)).await.unwrap(), 1);
        assert_eq!(allocate_id(&pool, Kind::Session, Some(&parent)).await.unwrap(), 2);
        assert_eq!(allocate_id(&pool, Kind::Speaker, None).await.unwrap(), 1);
        assert_eq!(allocate_id(&pool, Kind::Session, Some(&parent)).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_put_get_and_overwrite() {
        let pool = setup_test_pool().await;
        let doc = session(1, json!({"name": "A"}));
        put_documents(&pool, std::slice::from_ref(&doc)).await.unwrap();

        let fetched = get_document(&pool, &doc.key).await.unwrap().unwrap();
        assert_eq!(fetched, doc);

        let updated = session(1, json!({"name": "A2"}));
        put_documents(&pool, std::slice::from_ref(&updated)).await.unwrap();
        let fetched = get_document(&pool, &doc.key).await.unwrap().unwrap();
        assert_eq!(fetched.body["name"], "A2");
    }

    #[tokio::test]
    async fn test_get_documents_preserves_order_and_gaps() {
        let pool = setup_test_pool().await;
        seed_sessions(&pool).await;

        let k = |id| conference_key().child(Kind::Session, KeyId::Id(id));
        let docs = get_documents(&pool, &[k(3), k(99), k(1)]).await.unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].as_ref().unwrap().body["name"], "C");
        assert!(docs[1].is_none());
        assert_eq!(docs[2].as_ref().unwrap().body["name"], "A");
    }

    #[tokio::test]
    async fn test_delete_document() {
        let pool = setup_test_pool().await;
        let doc = session(1, json!({"name": "A"}));
        put_documents(&pool, std::slice::from_ref(&doc)).await.unwrap();

        assert!(delete_document(&pool, &doc.key).await.unwrap());
        assert!(!delete_document(&pool, &doc.key).await.unwrap());
        assert!(get_document(&pool, &doc.key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_equality_and_inequality() {
        let pool = setup_test_pool().await;
        seed_sessions(&pool).await;

        let q = Query::new(Kind::Session)
            .filter("typeOfSession", Comparison::Eq, PropertyValue::Text("WORKSHOP".into()))
            .filter("startTime", Comparison::Gt, PropertyValue::Text("12:00:00".into()));
        let docs = query_documents(&pool, &q).await.unwrap();
        assert_eq!(names(&docs), vec!["B"]);
    }

    #[tokio::test]
    async fn test_query_integer_property() {
        let pool = setup_test_pool().await;
        seed_sessions(&pool).await;

        let q = Query::new(Kind::Session).filter(
            "duration",
            Comparison::Ge,
            PropertyValue::Integer(90),
        );
        assert_eq!(names(&query_documents(&pool, &q).await.unwrap()), vec!["B"]);
    }

    #[tokio::test]
    async fn test_query_repeated_property_matches_any_element() {
        let pool = setup_test_pool().await;
        seed_sessions(&pool).await;

        let q = Query::new(Kind::Session).filter(
            "highlights",
            Comparison::Eq,
            PropertyValue::Text("async".into()),
        );
        assert_eq!(names(&query_documents(&pool, &q).await.unwrap()), vec!["C"]);

        let q = Query::new(Kind::Session).filter(
            "highlights",
            Comparison::Eq,
            PropertyValue::Text("rust".into()),
        );
        assert_eq!(names(&query_documents(&pool, &q).await.unwrap()), vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_query_empty_target_semantics() {
        let pool = setup_test_pool().await;
        seed_sessions(&pool).await;

        // Absent and "" are both empty
        let q = Query::new(Kind::Session).filter(
            "location",
            Comparison::Eq,
            PropertyValue::Text(String::new()),
        );
        assert_eq!(
            names(&query_documents(&pool, &q).await.unwrap()),
            vec!["A", "B", "C", "D"]
        );

        let q = Query::new(Kind::Session).filter(
            "highlights",
            Comparison::Ne,
            PropertyValue::Text(String::new()),
        );
        assert_eq!(names(&query_documents(&pool, &q).await.unwrap()), vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_query_ne_keeps_records_without_value() {
        let pool = setup_test_pool().await;
        seed_sessions(&pool).await;

        // C and D have no duration, so "not 60" holds for them
        let q = Query::new(Kind::Session).filter("duration", Comparison::Ne, PropertyValue::Integer(60));
        assert_eq!(
            names(&query_documents(&pool, &q).await.unwrap()),
            vec!["C", "D", "B"]
        );
    }

    #[tokio::test]
    async fn test_query_wrong_stored_type_never_matches() {
        let pool = setup_test_pool().await;
        put_documents(
            &pool,
            &[
                session(1, json!({"name": "A", "duration": "45"})),
                session(2, json!({"name": "B", "duration": 45})),
            ],
        )
        .await
        .unwrap();

        let q = Query::new(Kind::Session).filter("duration", Comparison::Ge, PropertyValue::Integer(45));
        assert_eq!(names(&query_documents(&pool, &q).await.unwrap()), vec!["B"]);

        let q = Query::new(Kind::Session).filter("duration", Comparison::Ne, PropertyValue::Integer(30));
        assert_eq!(names(&query_documents(&pool, &q).await.unwrap()), vec!["B"]);
    }

    #[tokio::test]
    async fn test_query_inequality_excludes_absent_and_orders_by_property() {
        let pool = setup_test_pool().await;
        seed_sessions(&pool).await;

        let q = Query::new(Kind::Session).filter(
            "startTime",
            Comparison::Ge,
            PropertyValue::Text("00:00:00".into()),
        );
        let docs = query_documents(&pool, &q).await.unwrap();
        assert_eq!(names(&docs), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_query_ancestor_scope() {
        let pool = setup_test_pool().await;
        seed_sessions(&pool).await;

        let other_conf = EntityKey::with_name(Kind::Profile, "ada@example.com")
            .child(Kind::Conference, KeyId::Id(10));
        put_documents(
            &pool,
            &[Document::new(
                other_conf.child(Kind::Session, KeyId::Id(1)),
                json!({"name": "E"}),
            )],
        )
        .await
        .unwrap();

        let scoped = Query::new(Kind::Session).ancestor(other_conf);
        assert_eq!(names(&query_documents(&pool, &scoped).await.unwrap()), vec!["E"]);

        // Conference#1 must not match Conference#10 by string prefix
        let scoped = Query::new(Kind::Session).ancestor(conference_key());
        assert_eq!(query_documents(&pool, &scoped).await.unwrap().len(), 4);

        let by_profile = Query::new(Kind::Session)
            .ancestor(EntityKey::with_name(Kind::Profile, "ada@example.com"));
        assert_eq!(query_documents(&pool, &by_profile).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_query_rejects_multi_property_inequality() {
        let pool = setup_test_pool().await;
        seed_sessions(&pool).await;

        let q = Query::new(Kind::Session)
            .filter("startTime", Comparison::Gt, PropertyValue::Text("12:00:00".into()))
            .filter("duration", Comparison::Lt, PropertyValue::Integer(100));
        assert!(matches!(
            query_documents(&pool, &q).await,
            Err(SqliteError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_build_query_sql_params_order() {
        let q = Query::new(Kind::Session)
            .ancestor(conference_key())
            .filter("duration", Comparison::Lt, PropertyValue::Integer(30));
        let mut params = SqlParams::default();
        let sql = build_query_sql(&q, &mut params).unwrap();

        assert_eq!(sql.matches('?').count(), params.values.len());
        assert_eq!(params.values[0], SqlValue::Text("Session".into()));
        assert_eq!(params.values[5], SqlValue::Integer(30));
        assert!(sql.contains("value < ?"));
    }
}
