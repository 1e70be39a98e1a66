//! Key decoding and typed loads shared by the services

use serde::de::DeserializeOwned;

use super::error::ServiceError;
use crate::data::keys::{EntityKey, Kind};
use crate::data::traits::DocumentStore;
use crate::data::types::{Document, Keyed};

/// Decode a websafe key that must point at an entity of `kind`
pub fn decode_key(websafe: &str, kind: Kind) -> Result<EntityKey, ServiceError> {
    match EntityKey::from_websafe(websafe) {
        Ok(key) if key.kind() == kind => Ok(key),
        _ => Err(not_found(kind, websafe)),
    }
}

pub fn not_found(kind: Kind, websafe: &str) -> ServiceError {
    ServiceError::not_found(format!(
        "No {} found with key: {}",
        kind.as_str().to_lowercase(),
        websafe
    ))
}

/// Load the entity behind a websafe key, 404 when it does not exist
pub async fn load<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    websafe: &str,
    kind: Kind,
) -> Result<Keyed<T>, ServiceError> {
    let key = decode_key(websafe, kind)?;
    match store.get(&key).await? {
        Some(doc) => Ok(Keyed::from_document(&doc)?),
        None => Err(not_found(kind, websafe)),
    }
}

pub fn from_documents<T: DeserializeOwned>(
    docs: &[Document],
) -> Result<Vec<Keyed<T>>, ServiceError> {
    docs.iter()
        .map(|doc| Keyed::from_document(doc).map_err(ServiceError::from))
        .collect()
}

/// Batch-load websafe keys of `kind`, skipping undecodable and missing ones.
/// Output follows input order.
pub async fn load_many<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    websafe_keys: &[String],
    kind: Kind,
) -> Result<Vec<Keyed<T>>, ServiceError> {
    let keys: Vec<EntityKey> = websafe_keys
        .iter()
        .filter_map(|k| decode_key(k, kind).ok())
        .collect();
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    let docs: Vec<Document> = store.get_multi(&keys).await?.into_iter().flatten().collect();
    from_documents(&docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SqliteService;
    use crate::data::types::Speaker;

    #[test]
    fn test_decode_key_checks_kind() {
        let key = EntityKey::with_id(Kind::Speaker, 3);
        assert_eq!(decode_key(&key.to_websafe(), Kind::Speaker).unwrap(), key);

        let err = decode_key(&key.to_websafe(), Kind::Session).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(msg) if msg.starts_with("No session found")));
        assert!(matches!(
            decode_key("garbage", Kind::Session),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let store = SqliteService::in_memory().await;
        let websafe = EntityKey::with_id(Kind::Speaker, 9).to_websafe();
        let err = load::<Speaker>(&store, &websafe, Kind::Speaker).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(msg) if msg.contains(&websafe)));
    }

    #[tokio::test]
    async fn test_load_many_skips_missing() {
        let store = SqliteService::in_memory().await;
        let present = Keyed {
            key: EntityKey::with_id(Kind::Speaker, 1),
            entity: Speaker {
                name: "Ada".into(),
                email: "ada@example.com".into(),
            },
        };
        store.put(&present.to_document().unwrap()).await.unwrap();

        let keys = vec![
            EntityKey::with_id(Kind::Speaker, 2).to_websafe(),
            present.key.to_websafe(),
            "not-a-key".to_string(),
        ];
        let loaded = load_many::<Speaker>(&store, &keys, Kind::Speaker).await.unwrap();
        assert_eq!(loaded, vec![present]);
    }
}
