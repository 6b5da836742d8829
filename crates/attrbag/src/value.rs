//! Attribute value types.
//!
//! This module defines the runtime representation of values held in a bag.
//! Values are dynamic: one bag can hold strings next to numbers next to
//! nested mappings.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::key::Key;
use crate::Attributes;

/// Runtime representation of an attribute value.
///
/// Equality is strict: `Int(1)` and `Float(1.0)` are different values, and
/// so are `Str("1")` and `Int(1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absence of a value.
    Null,

    Bool(bool),

    Int(i64),

    Float(f64),

    Str(String),

    /// Positional list of values.
    List(Vec<Value>),

    /// Nested ordered mapping (e.g. a group produced by `chunk`).
    Map(Attributes),
}

impl Value {
    /// Check if this value represents a "truthy" state.
    ///
    /// - Null: false
    /// - Bool: the boolean value itself
    /// - Int / Float: non-zero
    /// - Str: non-empty and not `"0"`
    /// - List / Map: non-empty
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(v) => *v,
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::Str(s) => !s.is_empty() && s != "0",
            Value::List(v) => !v.is_empty(),
            Value::Map(m) => !m.is_empty(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get a numeric value as `f64`, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Attributes> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Scalar rendered as text, the form loose comparison works on.
    ///
    /// Null and `false` render empty, `true` renders `"1"`, floats with no
    /// fractional part render without a decimal point. Lists and maps have no
    /// text form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null | Value::Bool(false) => Some(String::new()),
            Value::Bool(true) => Some("1".to_string()),
            Value::Int(v) => Some(v.to_string()),
            Value::Float(v) => Some(v.to_string()),
            Value::Str(s) => Some(s.clone()),
            Value::List(_) | Value::Map(_) => None,
        }
    }

    /// Equality by text form, used by the default `diff`/`intersect` family.
    ///
    /// `Int(1)`, `Float(1.0)` and `Str("1")` are loosely equal; so are `Null`,
    /// `false` and `""`. Lists and maps fall back to strict equality.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self.to_text(), other.to_text()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self == other,
            _ => false,
        }
    }

    /// Rank of each variant in the natural ordering. Numbers share a rank.
    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Str(_) => 3,
            Value::List(_) => 4,
            Value::Map(_) => 5,
        }
    }

    /// Total natural ordering used when sorting without a comparator.
    ///
    /// Null < Bool < numbers < strings < lists < maps. Integers and floats
    /// compare numerically; lists compare element-wise, maps by length and
    /// then entry-wise in insertion order.
    pub fn natural_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    let ord = x.natural_cmp(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Map(a), Value::Map(b)) => a.len().cmp(&b.len()).then_with(|| {
                for ((ka, va), (kb, vb)) in a.iter().zip(b) {
                    let ord = ka.cmp(kb).then_with(|| va.natural_cmp(vb));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            }),
            (a, b) if a.rank() == 2 && b.rank() == 2 => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => Ordering::Equal,
            },
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<Attributes> for Value {
    fn from(v: Attributes) -> Self {
        Value::Map(v)
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Index(i) => Value::Int(i as i64),
            Key::Name(s) => Value::Str(s),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (Key::from(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn is_truthy_for_scalars() {
        assert!(!Value::Null.is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
    }

    #[test]
    fn is_truthy_for_strings() {
        assert!(Value::from("a").is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::from("0").is_truthy());
    }

    #[test]
    fn is_truthy_for_containers() {
        assert!(Value::from(vec![1]).is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(!Value::Map(Attributes::new()).is_truthy());
    }

    #[test]
    fn equality_is_strict() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Int(1), Value::from("1"));
        assert_eq!(Value::from(45), Value::Int(45));
    }

    #[test]
    fn loose_equality_compares_text_forms() {
        assert!(Value::Int(1).loose_eq(&Value::from("1")));
        assert!(Value::Float(1.0).loose_eq(&Value::Int(1)));
        assert!(Value::Bool(true).loose_eq(&Value::from("1")));
        assert!(Value::Null.loose_eq(&Value::from("")));
        assert!(Value::Null.loose_eq(&Value::Bool(false)));
        assert!(!Value::Int(1).loose_eq(&Value::from("01")));
        assert!(!Value::Float(1.5).loose_eq(&Value::Int(1)));
        assert!(!Value::from(vec![1]).loose_eq(&Value::from("1")));
        assert!(Value::from(vec![1]).loose_eq(&Value::from(vec![1])));
    }

    #[test]
    fn natural_order_across_variants() {
        let mut values = vec![
            Value::from("b"),
            Value::Float(2.5),
            Value::Null,
            Value::Int(3),
            Value::Bool(true),
            Value::from("a"),
            Value::Int(1),
        ];
        values.sort_by(Value::natural_cmp);
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(1),
                Value::Float(2.5),
                Value::Int(3),
                Value::from("a"),
                Value::from("b"),
            ]
        );
    }

    #[test]
    fn natural_order_for_lists_is_element_wise() {
        let a = Value::from(vec![1, 2]);
        let b = Value::from(vec![1, 3]);
        let c = Value::from(vec![1, 2, 0]);
        assert_eq!(a.natural_cmp(&b), Ordering::Less);
        assert_eq!(a.natural_cmp(&c), Ordering::Less);
        assert_eq!(b.natural_cmp(&c), Ordering::Greater);
    }

    #[test]
    fn converts_from_json() {
        let value = Value::from(json!({"name": "John", "age": 45, "tags": ["a"], "score": 1.5}));
        let map = value.as_map().unwrap();
        assert_eq!(map[&Key::from("name")], Value::from("John"));
        assert_eq!(map[&Key::from("age")], Value::Int(45));
        assert_eq!(map[&Key::from("tags")], Value::from(vec!["a"]));
        assert_eq!(map[&Key::from("score")], Value::Float(1.5));
    }

    #[test]
    fn serializes_untagged() {
        let value = Value::from(vec![Value::Null, Value::from(1), Value::from("x")]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"[null,1,"x"]"#);
        let loaded: Value = serde_json::from_str(r#"{"a":1,"b":[true,2.5]}"#).unwrap();
        let map = loaded.as_map().unwrap();
        assert_eq!(map[&Key::from("a")], Value::Int(1));
        assert_eq!(
            map[&Key::from("b")],
            Value::List(vec![Value::Bool(true), Value::Float(2.5)])
        );
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }
}
