use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Row identifier.
///
/// The store hands out integer keys, but everything above the store treats
/// ids as opaque strings. `RowId` accepts either form when deserializing and
/// writes numeric ids back as JSON numbers so foreign-key columns stay typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(String);

impl RowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The id as an integer, if the store assigned a numeric key.
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RowId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<i64> for RowId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl Serialize for RowId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Only canonical integers go out as numbers; "007" stays a string.
        match self.as_i64().filter(|n| n.to_string() == self.0) {
            Some(n) => serializer.serialize_i64(n),
            None => serializer.serialize_str(&self.0),
        }
    }
}

struct RowIdVisitor;

impl<'de> Visitor<'de> for RowIdVisitor {
    type Value = RowId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or string row id")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RowId, E> {
        Ok(RowId::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RowId, E> {
        Ok(RowId(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RowId, E> {
        Ok(RowId::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RowId, E> {
        Ok(RowId(v))
    }
}

impl<'de> Deserialize<'de> for RowId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RowIdVisitor)
    }
}
