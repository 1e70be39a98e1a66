//! Hierarchical entity keys
//!
//! A key is a path of `(kind, id)` elements from the root entity down to the
//! entity itself, e.g. `Profile("ada@example.com") / Conference(12) / Session(40)`.
//! The websafe form is the URL-safe base64 encoding of the path and is what
//! clients see in URLs and request bodies.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use super::error::DataError;

/// Entity kinds stored in the document store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Profile,
    Conference,
    Session,
    Speaker,
    Wishlist,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::Conference => "Conference",
            Self::Session => "Session",
            Self::Speaker => "Speaker",
            Self::Wishlist => "Wishlist",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Profile" => Ok(Self::Profile),
            "Conference" => Ok(Self::Conference),
            "Session" => Ok(Self::Session),
            "Speaker" => Ok(Self::Speaker),
            "Wishlist" => Ok(Self::Wishlist),
            other => Err(DataError::invalid_key(format!("unknown kind: {}", other))),
        }
    }
}

/// Identifier of a single path element: an allocated integer or a string name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyId {
    Id(i64),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathElement {
    pub kind: Kind,
    pub id: KeyId,
}

/// Full key of a stored entity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    path: Vec<PathElement>,
}

impl EntityKey {
    /// Root key with an allocated id
    pub fn with_id(kind: Kind, id: i64) -> Self {
        Self {
            path: vec![PathElement {
                kind,
                id: KeyId::Id(id),
            }],
        }
    }

    /// Root key with a string name
    pub fn with_name(kind: Kind, name: impl Into<String>) -> Self {
        Self {
            path: vec![PathElement {
                kind,
                id: KeyId::Name(name.into()),
            }],
        }
    }

    /// Child key under `self`
    pub fn child(&self, kind: Kind, id: KeyId) -> Self {
        let mut path = self.path.clone();
        path.push(PathElement { kind, id });
        Self { path }
    }

    pub fn kind(&self) -> Kind {
        self.last().kind
    }

    pub fn id(&self) -> &KeyId {
        &self.last().id
    }

    /// Integer id of the last element, if it has one
    pub fn int_id(&self) -> Option<i64> {
        match self.id() {
            KeyId::Id(id) => Some(*id),
            KeyId::Name(_) => None,
        }
    }

    /// Name of the last element, if it has one
    pub fn name(&self) -> Option<&str> {
        match self.id() {
            KeyId::Id(_) => None,
            KeyId::Name(name) => Some(name),
        }
    }

    pub fn parent(&self) -> Option<EntityKey> {
        if self.path.len() < 2 {
            return None;
        }
        Some(Self {
            path: self.path[..self.path.len() - 1].to_vec(),
        })
    }

    pub fn path(&self) -> &[PathElement] {
        &self.path
    }

    /// Whether `self` is a strict descendant of `ancestor`
    pub fn is_descendant_of(&self, ancestor: &EntityKey) -> bool {
        self.path.len() > ancestor.path.len() && self.path.starts_with(&ancestor.path)
    }

    /// Canonical path string used as the storage primary key.
    ///
    /// Elements are joined with `/`. Names escape `%` and `/` so that a
    /// descendant's path always starts with `{ancestor}/`.
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(|el| match &el.id {
                KeyId::Id(id) => format!("{}#{}", el.kind, id),
                KeyId::Name(name) => {
                    format!("{}={}", el.kind, name.replace('%', "%25").replace('/', "%2F"))
                }
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Inverse of [`EntityKey::path_string`]
    pub fn from_path_string(path: &str) -> Result<Self, DataError> {
        let elements = path
            .split('/')
            .map(|segment| {
                // Kind names never contain the separators, so the first one wins
                let Some(sep) = segment.find(['#', '=']) else {
                    return Err(DataError::invalid_key(format!("bad key path: {}", path)));
                };
                let (kind, rest) = segment.split_at(sep);
                let id = match &rest[..1] {
                    "#" => KeyId::Id(rest[1..].parse::<i64>().map_err(|_| {
                        DataError::invalid_key(format!("bad id in path: {}", path))
                    })?),
                    _ => KeyId::Name(rest[1..].replace("%2F", "/").replace("%25", "%")),
                };
                Ok(PathElement {
                    kind: kind.parse()?,
                    id,
                })
            })
            .collect::<Result<Vec<_>, DataError>>()?;
        Ok(Self { path: elements })
    }

    /// URL-safe string form
    pub fn to_websafe(&self) -> String {
        // Vec<PathElement> of plain enums and strings always serializes
        let json = serde_json::to_vec(&self.path).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Parse a websafe key
    pub fn from_websafe(websafe: &str) -> Result<Self, DataError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(websafe.trim())
            .map_err(|_| DataError::invalid_key(format!("not a websafe key: {}", websafe)))?;
        let path: Vec<PathElement> = serde_json::from_slice(&bytes)
            .map_err(|_| DataError::invalid_key(format!("not a websafe key: {}", websafe)))?;
        if path.is_empty() {
            return Err(DataError::invalid_key("empty key path"));
        }
        Ok(Self { path })
    }

    fn last(&self) -> &PathElement {
        // Constructors never produce an empty path
        &self.path[self.path.len() - 1]
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_key() -> EntityKey {
        EntityKey::with_name(Kind::Profile, "ada@example.com")
            .child(Kind::Conference, KeyId::Id(12))
            .child(Kind::Session, KeyId::Id(40))
    }

    #[test]
    fn test_websafe_roundtrip() {
        let key = session_key();
        let websafe = key.to_websafe();
        assert!(!websafe.contains('/'));
        assert!(!websafe.contains('+'));
        assert_eq!(EntityKey::from_websafe(&websafe).unwrap(), key);
    }

    #[test]
    fn test_from_websafe_rejects_garbage() {
        assert!(matches!(
            EntityKey::from_websafe("!!not-base64!!"),
            Err(DataError::InvalidKey(_))
        ));
        let empty = URL_SAFE_NO_PAD.encode("[]");
        assert!(EntityKey::from_websafe(&empty).is_err());
        let unknown = URL_SAFE_NO_PAD.encode(r#"[{"kind":"Venue","id":1}]"#);
        assert!(EntityKey::from_websafe(&unknown).is_err());
    }

    #[test]
    fn test_path_string_escapes_names() {
        let key = EntityKey::with_name(Kind::Profile, "a/b%c").child(Kind::Wishlist, KeyId::Id(1));
        assert_eq!(key.path_string(), "Profile=a%2Fb%25c/Wishlist#1");
        assert_eq!(EntityKey::from_path_string(&key.path_string()).unwrap(), key);
    }

    #[test]
    fn test_from_path_string() {
        let key = session_key();
        assert_eq!(EntityKey::from_path_string(&key.path_string()).unwrap(), key);
        let odd = EntityKey::with_name(Kind::Profile, "ada#1=x");
        assert_eq!(EntityKey::from_path_string(&odd.path_string()).unwrap(), odd);
        assert!(EntityKey::from_path_string("Session#x").is_err());
        assert!(EntityKey::from_path_string("Session").is_err());
    }

    #[test]
    fn test_parent_and_accessors() {
        let key = session_key();
        assert_eq!(key.kind(), Kind::Session);
        assert_eq!(key.int_id(), Some(40));
        assert_eq!(key.name(), None);

        let conf = key.parent().unwrap();
        assert_eq!(conf.kind(), Kind::Conference);
        let profile = conf.parent().unwrap();
        assert_eq!(profile.name(), Some("ada@example.com"));
        assert!(profile.parent().is_none());
    }

    #[test]
    fn test_is_descendant_of() {
        let key = session_key();
        let conf = key.parent().unwrap();
        assert!(key.is_descendant_of(&conf));
        assert!(!conf.is_descendant_of(&key));
        assert!(!key.is_descendant_of(&key));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Speaker".parse::<Kind>().unwrap(), Kind::Speaker);
        assert!("speaker".parse::<Kind>().is_err());
    }
}
