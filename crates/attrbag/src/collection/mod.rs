//! # Containers
//!
//! This module defines the [`Container`] trait, the operator library shared by
//! every bag kind, and [`Collection`], the plain bag.
//!
//! ## The Factory Capability
//!
//! Every transformation (`map`, `filter`, `merge`, ...) returns a *new* bag of
//! the same concrete kind as the receiver. Implementors supply that through
//! [`Container::new_instance`]; the operators never name a concrete type.
//! A [`Model`](crate::Model) runs its validated fill inside `new_instance`, so
//! building a derived instance can fail and the operators return [`Result`].
//!
//! The one exception is [`Container::chunk`], which always yields plain
//! [`Collection`]s.
//!
//! ## Mutation
//!
//! Only `fill`, `set_attribute`, `put`, `add`, `push`, `remove` and `splice`
//! touch the receiver. Everything else reads it.
//!
//! ## The Cursor
//!
//! Each bag carries a cursor over its entries for `first`/`last`/`current`/
//! `key`/`next`. The cursor is a position, `None` is returned once it runs past
//! the last entry.

pub mod ops;

use std::cmp::Ordering;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::{CollectionError, Result};
use crate::key::Key;
use crate::value::Value;
use crate::Attributes;

/// Returned by `Index` for missing keys.
pub(crate) static NULL: Value = Value::Null;

/// Ordered attribute container with a library of fluent operators.
///
/// Implementors provide storage access and the two constructors (`fill` and
/// `new_instance`); every other method is derived from those.
pub trait Container: Sized {
    fn attributes(&self) -> &Attributes;

    fn attributes_mut(&mut self) -> &mut Attributes;

    /// Cursor position, `attributes().len()` when exhausted.
    fn position(&self) -> usize;

    fn set_position(&mut self, position: usize);

    /// Load `attributes` into the receiver.
    fn fill(&mut self, attributes: Attributes) -> Result<()>;

    /// A new bag of the receiver's kind holding `attributes`.
    fn new_instance(&self, attributes: Attributes) -> Result<Self>;

    // --- whole-bag views ---

    fn all(&self) -> &Attributes {
        self.attributes()
    }

    fn get_attributes(&self) -> &Attributes {
        self.attributes()
    }

    /// Detached copy of the mapping.
    fn to_array(&self) -> Attributes {
        self.attributes().clone()
    }

    fn values(&self) -> Vec<Value> {
        self.attributes().values().cloned().collect()
    }

    fn keys(&self) -> Vec<Key> {
        self.attributes().keys().cloned().collect()
    }

    fn iter(&self) -> indexmap::map::Iter<'_, Key, Value> {
        self.attributes().iter()
    }

    fn count(&self) -> usize {
        self.attributes().len()
    }

    fn is_empty(&self) -> bool {
        self.attributes().is_empty()
    }

    // --- cursor ---

    /// Rewind the cursor and return the first value.
    fn first(&mut self) -> Option<&Value> {
        self.set_position(0);
        self.current()
    }

    /// Move the cursor to the end and return the last value.
    fn last(&mut self) -> Option<&Value> {
        let len = self.count();
        self.set_position(len.saturating_sub(1));
        self.current()
    }

    fn current(&self) -> Option<&Value> {
        self.attributes()
            .get_index(self.position())
            .map(|(_, value)| value)
    }

    fn key(&self) -> Option<&Key> {
        self.attributes().get_index(self.position()).map(|(key, _)| key)
    }

    /// Advance the cursor and return the value it lands on.
    fn next(&mut self) -> Option<&Value> {
        let len = self.count();
        let position = self.position();
        if position < len {
            self.set_position(position + 1);
        }
        self.current()
    }

    // --- keyed access ---

    fn has_key(&self, key: impl Into<Key>) -> bool {
        self.attributes().contains_key(&key.into())
    }

    fn has(&self, key: impl Into<Key>) -> bool {
        self.has_key(key)
    }

    fn get_attribute(&self, key: impl Into<Key>) -> Option<&Value> {
        self.attributes().get(&key.into())
    }

    fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        self.get_attribute(key)
    }

    fn set_attribute(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> &mut Self {
        self.attributes_mut().insert(key.into(), value.into());
        self
    }

    fn set(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> &mut Self {
        self.set_attribute(key, value)
    }

    /// Indexed assignment: `None` appends under the next index key.
    fn put(&mut self, key: Option<Key>, value: impl Into<Value>) -> &mut Self {
        match key {
            Some(key) => self.set_attribute(key, value),
            None => self.add(value),
        }
    }

    fn add(&mut self, value: impl Into<Value>) -> &mut Self {
        ops::append(self.attributes_mut(), value.into());
        self
    }

    fn push(&mut self, value: impl Into<Value>) -> &mut Self {
        self.put(None, value)
    }

    /// Remove `key`, returning whether it was present.
    ///
    /// The cursor stays on the same entry when an earlier one is removed, and
    /// moves on to the following entry when the current one is.
    fn remove(&mut self, key: impl Into<Key>) -> bool {
        let Some((index, _, _)) = self.attributes_mut().shift_remove_full(&key.into()) else {
            return false;
        };
        let position = self.position();
        if index < position {
            self.set_position(position - 1);
        }
        true
    }

    /// Whether `value` is stored under any key.
    fn has_attribute(&self, value: impl Into<Value>) -> bool {
        let value = value.into();
        self.attributes().values().any(|v| *v == value)
    }

    /// First key holding `value`.
    fn index_of(&self, value: impl Into<Value>) -> Option<&Key> {
        let value = value.into();
        self.attributes()
            .iter()
            .find(|(_, v)| **v == value)
            .map(|(k, _)| k)
    }

    // --- transformations ---

    fn map<F>(&self, mut f: F) -> Result<Self>
    where
        F: FnMut(&Value) -> Value,
    {
        self.new_instance(
            self.attributes()
                .iter()
                .map(|(k, v)| (k.clone(), f(v)))
                .collect(),
        )
    }

    /// Flat-map each entry into zero or more new entries; later keys win.
    fn map_with_keys<F, I, K, V>(&self, mut f: F) -> Result<Self>
    where
        F: FnMut(&Value, &Key) -> I,
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Value>,
    {
        let mut result = Attributes::new();
        for (key, value) in self.attributes() {
            for (k, v) in f(value, key) {
                result.insert(k.into(), v.into());
            }
        }
        self.new_instance(result)
    }

    fn filter<F>(&self, mut f: F) -> Result<Self>
    where
        F: FnMut(&Value, &Key) -> bool,
    {
        self.new_instance(
            self.attributes()
                .iter()
                .filter(|&(k, v)| f(v, k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Fold every entry into an accumulator and wrap the result.
    ///
    /// The final accumulator goes through `new_instance`: a `Map` becomes the
    /// new bag's mapping, a `List` becomes an index-keyed mapping, anything
    /// else fails with [`CollectionError::NotAMapping`]. Use [`fold`] for a
    /// plain accumulator.
    ///
    /// [`fold`]: Container::fold
    fn reduce<F>(&self, f: F, initial: impl Into<Value>) -> Result<Self>
    where
        F: FnMut(Value, &Value, &Key) -> Value,
    {
        match self.fold(initial.into(), f) {
            Value::Map(attributes) => self.new_instance(attributes),
            Value::List(items) => self.new_instance(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (Key::Index(i), v))
                    .collect(),
            ),
            other => Err(CollectionError::NotAMapping(other)),
        }
    }

    fn fold<T, F>(&self, initial: T, mut f: F) -> T
    where
        F: FnMut(T, &Value, &Key) -> T,
    {
        self.attributes()
            .iter()
            .fold(initial, |acc, (k, v)| f(acc, v, k))
    }

    /// Entries whose value does not occur in `other`, compared by
    /// [`Value::loose_eq`].
    fn diff(&self, other: &Attributes) -> Result<Self> {
        self.diff_using(other, Value::loose_eq)
    }

    fn diff_using<F>(&self, other: &Attributes, mut eq: F) -> Result<Self>
    where
        F: FnMut(&Value, &Value) -> bool,
    {
        self.filter(|value, _| !other.values().any(|o| eq(value, o)))
    }

    /// Entries whose key/value pair does not occur in `other`.
    fn diff_assoc(&self, other: &Attributes) -> Result<Self> {
        self.diff_assoc_using(other, Value::loose_eq)
    }

    fn diff_assoc_using<F>(&self, other: &Attributes, mut eq: F) -> Result<Self>
    where
        F: FnMut(&Value, &Value) -> bool,
    {
        self.filter(|value, key| match other.get(key) {
            Some(o) => !eq(value, o),
            None => true,
        })
    }

    /// Entries whose key does not occur in `other`.
    fn diff_keys(&self, other: &Attributes) -> Result<Self> {
        self.filter(|_, key| !other.contains_key(key))
    }

    fn diff_keys_using<F>(&self, other: &Attributes, mut eq: F) -> Result<Self>
    where
        F: FnMut(&Key, &Key) -> bool,
    {
        self.filter(|_, key| !other.keys().any(|o| eq(key, o)))
    }

    /// Entries whose value occurs in `other`, compared by [`Value::loose_eq`].
    fn intersect(&self, other: &Attributes) -> Result<Self> {
        self.filter(|value, _| other.values().any(|o| value.loose_eq(o)))
    }

    fn intersect_by_keys(&self, other: &Attributes) -> Result<Self> {
        self.filter(|_, key| other.contains_key(key))
    }

    /// Call `f` for every entry in order until it returns `false`.
    fn each<F>(&self, mut f: F) -> &Self
    where
        F: FnMut(&Value, &Key) -> bool,
    {
        for (key, value) in self.attributes() {
            if !f(value, key) {
                break;
            }
        }
        self
    }

    /// Apply `then` when `condition` is truthy, otherwise pass the receiver
    /// through. The callback receives the condition value itself.
    fn when<F>(self, condition: impl Into<Value>, then: F) -> Self
    where
        F: FnOnce(Self, Value) -> Self,
    {
        let condition = condition.into();
        if condition.is_truthy() {
            then(self, condition)
        } else {
            self
        }
    }

    fn when_else<R, F, G>(self, condition: impl Into<Value>, then: F, otherwise: G) -> R
    where
        F: FnOnce(Self, Value) -> R,
        G: FnOnce(Self, Value) -> R,
    {
        let condition = condition.into();
        if condition.is_truthy() {
            then(self, condition)
        } else {
            otherwise(self, condition)
        }
    }

    /// Swap keys and values; values that cannot be keys are skipped.
    fn flip(&self) -> Result<Self> {
        self.new_instance(ops::flip(self.attributes()))
    }

    /// Cut a window out of the receiver and return it as a new bag.
    ///
    /// `replacement` values are inserted where the window was. Index keys of
    /// both the receiver and the removed bag are renumbered.
    fn splice(
        &mut self,
        offset: isize,
        length: Option<isize>,
        replacement: Vec<Value>,
    ) -> Result<Self> {
        let removed = ops::splice(self.attributes_mut(), offset, length, replacement);
        self.set_position(0);
        self.new_instance(removed)
    }

    fn merge(&self, other: &Attributes) -> Result<Self> {
        self.new_instance(ops::merge(self.attributes(), other))
    }

    /// Use the receiver's values as keys for `values`.
    fn combine<I, V>(&self, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.new_instance(ops::combine(self.attributes(), values)?)
    }

    /// Split into `(matches, non_matches)`.
    fn partition<F>(&self, mut f: F) -> Result<(Self, Self)>
    where
        F: FnMut(&Key, &Value) -> bool,
    {
        let mut matches = Attributes::new();
        let mut non_matches = Attributes::new();
        for (key, value) in self.attributes() {
            let target = if f(key, value) {
                &mut matches
            } else {
                &mut non_matches
            };
            target.insert(key.clone(), value.clone());
        }
        Ok((self.new_instance(matches)?, self.new_instance(non_matches)?))
    }

    fn reverse(&self) -> Result<Self> {
        self.new_instance(
            self.attributes()
                .iter()
                .rev()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    fn pad(&self, size: isize, value: impl Into<Value>) -> Result<Self> {
        self.new_instance(ops::pad(self.attributes(), size, &value.into()))
    }

    /// Plain snapshot of a window, keys preserved.
    fn slice(&self, offset: isize, length: Option<isize>) -> Attributes {
        ops::slice(self.attributes(), offset, length)
    }

    /// Groups of at most `size` entries as a plain [`Collection`] of maps.
    fn chunk(&self, size: usize) -> Collection {
        Collection::new(
            ops::chunk(self.attributes(), size)
                .into_iter()
                .enumerate()
                .map(|(i, group)| (Key::Index(i), Value::Map(group)))
                .collect(),
        )
    }

    fn exists<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&Key, &Value) -> bool,
    {
        self.attributes().iter().any(|(k, v)| f(k, v))
    }

    /// Sort values by their natural order, keeping keys attached.
    fn sort(&self) -> Result<Self> {
        self.sort_by(Value::natural_cmp)
    }

    fn sort_by<F>(&self, mut cmp: F) -> Result<Self>
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        let mut attributes = self.attributes().clone();
        attributes.sort_by(|_, a, _, b| cmp(a, b));
        self.new_instance(attributes)
    }
}

/// The plain attribute bag.
///
/// ```
/// use attrbag::{Collection, Container};
///
/// let mut people: Collection = [("first_name", "John"), ("last_name", "Doe")]
///     .into_iter()
///     .collect();
/// assert_eq!(people.first().and_then(|v| v.as_str()), Some("John"));
///
/// let shouting = people.map(|v| v.as_str().unwrap_or_default().to_uppercase().into()).unwrap();
/// assert_eq!(shouting["last_name"].as_str(), Some("DOE"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    attributes: Attributes,
    #[serde(skip)]
    position: usize,
}

impl Collection {
    pub fn new(attributes: Attributes) -> Self {
        Self {
            attributes,
            position: 0,
        }
    }

    /// Build from a JSON object (name keys) or array (index keys).
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match Value::from(json) {
            Value::Map(attributes) => Ok(Self::new(attributes)),
            Value::List(items) => Ok(items.into_iter().collect()),
            other => Err(CollectionError::NotAMapping(other)),
        }
    }

    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }
}

impl Container for Collection {
    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    fn fill(&mut self, attributes: Attributes) -> Result<()> {
        self.attributes = attributes;
        self.position = 0;
        Ok(())
    }

    fn new_instance(&self, attributes: Attributes) -> Result<Self> {
        Ok(Self::new(attributes))
    }
}

/// Two bags are equal when they hold the same entries; the cursor is ignored.
impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
    }
}

impl From<Attributes> for Collection {
    fn from(attributes: Attributes) -> Self {
        Self::new(attributes)
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Collection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(crate::attributes(iter))
    }
}

/// Values collected into a bag get index keys `0..n`.
impl FromIterator<Value> for Collection {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut collection = Self::default();
        for value in iter {
            collection.add(value);
        }
        collection
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = (&'a Key, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}

impl IntoIterator for Collection {
    type Item = (Key, Value);
    type IntoIter = indexmap::map::IntoIter<Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.into_iter()
    }
}

/// Missing keys read as [`Value::Null`].
impl<K: Into<Key>> Index<K> for Collection {
    type Output = Value;

    fn index(&self, key: K) -> &Value {
        self.attributes.get(&key.into()).unwrap_or(&NULL)
    }
}
