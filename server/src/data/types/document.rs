//! Stored documents

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::data::error::DataError;
use crate::data::keys::EntityKey;

/// A keyed JSON document as held by the store
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: EntityKey,
    pub body: Value,
}

impl Document {
    pub fn new(key: EntityKey, body: Value) -> Self {
        Self { key, body }
    }

    /// Serialize an entity into a document under `key`
    pub fn from_entity<T: Serialize>(key: EntityKey, entity: &T) -> Result<Self, DataError> {
        Ok(Self {
            key,
            body: serde_json::to_value(entity)?,
        })
    }

    /// Deserialize the body into an entity
    pub fn to_entity<T: DeserializeOwned>(&self) -> Result<T, DataError> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    /// Top-level property of the body, `None` when absent
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }
}

/// An entity together with its key
#[derive(Debug, Clone, PartialEq)]
pub struct Keyed<T> {
    pub key: EntityKey,
    pub entity: T,
}

impl<T: DeserializeOwned> Keyed<T> {
    pub fn from_document(doc: &Document) -> Result<Self, DataError> {
        Ok(Self {
            key: doc.key.clone(),
            entity: doc.to_entity()?,
        })
    }
}

impl<T: Serialize> Keyed<T> {
    pub fn to_document(&self) -> Result<Document, DataError> {
        Document::from_entity(self.key.clone(), &self.entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::keys::Kind;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Room {
        name: String,
        seat_count: i64,
    }

    #[test]
    fn test_entity_roundtrip_through_document() {
        let room = Keyed {
            key: EntityKey::with_id(Kind::Speaker, 1),
            entity: Room {
                name: "Main".to_string(),
                seat_count: 40,
            },
        };
        let doc = room.to_document().unwrap();
        assert_eq!(doc.property("seatCount"), Some(&Value::from(40)));
        assert!(doc.property("missing").is_none());

        let back: Keyed<Room> = Keyed::from_document(&doc).unwrap();
        assert_eq!(back, room);
    }

    #[test]
    fn test_to_entity_type_mismatch() {
        let doc = Document::new(
            EntityKey::with_id(Kind::Speaker, 1),
            serde_json::json!({"name": 5}),
        );
        assert!(matches!(
            doc.to_entity::<Room>(),
            Err(DataError::Serialization(_))
        ));
    }
}
