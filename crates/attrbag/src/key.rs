//! Attribute keys.
//!
//! A key is either a positional index or a name. Indexes are what `add`/`push`
//! hand out; names are what models and most callers use.
//!
//! Names written as a canonical non-negative decimal (`"0"`, `"42"`, but not
//! `"007"` or `"-1"`) are indexes, so `"3"` and `3` address the same entry and
//! index keys survive a trip through JSON object keys.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CollectionError;
use crate::value::Value;

/// Key of an entry in an attribute bag.
///
/// Indexes order before names, so a sorted key list groups positional
/// entries first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Index(usize),
    Name(String),
}

impl Key {
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(i) => Some(*i),
            Key::Name(_) => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Name(s) => Some(s),
            Key::Index(_) => None,
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Key::Index(_))
    }

    /// Parse a name, turning canonical decimal strings into indexes.
    pub fn parse(name: &str) -> Key {
        match canonical_index(name) {
            Some(index) => Key::Index(index),
            None => Key::Name(name.to_string()),
        }
    }
}

fn canonical_index(name: &str) -> Option<usize> {
    let bytes = name.as_bytes();
    let canonical = match bytes {
        [] => false,
        [b'0'] => true,
        [first, rest @ ..] => {
            (b'1'..=b'9').contains(first) && rest.iter().all(u8::is_ascii_digit)
        }
    };
    if canonical {
        name.parse().ok()
    } else {
        None
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{}", i),
            Key::Name(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::parse(name)
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        match canonical_index(&name) {
            Some(index) => Key::Index(index),
            None => Key::Name(name),
        }
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Key::parse(name)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

/// Negative integers have no index form and become names (`-1` is `"-1"`).
impl From<i32> for Key {
    fn from(index: i32) -> Self {
        match usize::try_from(index) {
            Ok(index) => Key::Index(index),
            Err(_) => Key::Name(index.to_string()),
        }
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

/// Only strings and non-negative integers can become keys.
impl TryFrom<&Value> for Key {
    type Error = CollectionError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Str(s) => Ok(Key::parse(s)),
            Value::Int(i) if *i >= 0 => Ok(Key::Index(*i as usize)),
            other => Err(CollectionError::InvalidKey(other.clone())),
        }
    }
}

/// Renders keys as a comma separated list, used in error messages.
pub(crate) fn join_keys(keys: &[Key]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Key::Index(i) => serializer.serialize_u64(*i as u64),
            Key::Name(s) => serializer.serialize_str(s),
        }
    }
}

struct KeyVisitor;

impl<'de> Visitor<'de> for KeyVisitor {
    type Value = Key;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or a non-negative integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Key, E> {
        usize::try_from(v)
            .map(Key::Index)
            .map_err(|_| E::custom(format!("index {} out of range", v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Key, E> {
        if v < 0 {
            return Err(E::custom(format!("negative index {}", v)));
        }
        self.visit_u64(v as u64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Key, E> {
        Ok(Key::parse(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Key, E> {
        Ok(Key::from(v))
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(KeyVisitor)
    }
}
