//! # Models: Bags With a Fill Policy
//!
//! A [`Model`] is a bag whose `fill` enforces a [`FillPolicy`]:
//!
//! 1. **Required check**: every required key must be present in the input,
//!    otherwise the fill fails with [`CollectionError::MissingRequiredFields`]
//!    naming all of the missing keys. Nothing is written in that case.
//! 2. **Whitelist**: when the fillable list is non-empty, input entries whose
//!    key is not listed are dropped without error.
//! 3. **Assignment**: retained entries are set one by one, so filling an
//!    existing model updates it rather than replacing it.
//!
//! The policy of a model kind comes from its [`ModelDefinition`]. Every
//! instance starts with that policy and may adjust it through the setters;
//! derived instances (from `map`, `filter`, ...) inherit the receiver's policy
//! and are validated by it.
//!
//! ```
//! use attrbag::{attributes, Container, Key, Model, ModelDefinition};
//!
//! struct Account;
//!
//! impl ModelDefinition for Account {
//!     fn required() -> Vec<Key> {
//!         vec!["email".into()]
//!     }
//! }
//!
//! let account = Model::<Account>::new(attributes([("email", "a@example.com")])).unwrap();
//! // Filtering out a required key fails like any other fill would.
//! assert!(account.filter(|_, key| *key != Key::from("email")).is_err());
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::collection::{Container, NULL};
use crate::config::FillPolicy;
use crate::error::{CollectionError, Result};
use crate::key::Key;
use crate::value::Value;
use crate::Attributes;

/// Class-level policy of a model kind.
pub trait ModelDefinition {
    /// Keys kept by `fill`; empty keeps everything.
    fn fillable() -> Vec<Key> {
        Vec::new()
    }

    /// Keys every `fill` must provide.
    fn required() -> Vec<Key> {
        Vec::new()
    }

    fn policy() -> FillPolicy {
        FillPolicy::new(Self::fillable(), Self::required())
    }
}

/// Definition without rules, for models built from an explicit [`FillPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AdHoc;

impl ModelDefinition for AdHoc {}

pub struct Model<D: ModelDefinition = AdHoc> {
    attributes: Attributes,
    position: usize,
    policy: FillPolicy,
    kind: PhantomData<fn() -> D>,
}

impl<D: ModelDefinition> Model<D> {
    /// Build a model of kind `D` and fill it with `attributes`.
    pub fn new(attributes: Attributes) -> Result<Self> {
        Self::with_policy(D::policy(), attributes)
    }

    /// Build a model that enforces `policy` instead of `D`'s.
    pub fn with_policy(policy: FillPolicy, attributes: Attributes) -> Result<Self> {
        let mut model = Self {
            attributes: Attributes::new(),
            position: 0,
            policy,
            kind: PhantomData,
        };
        model.fill(attributes)?;
        Ok(model)
    }

    pub fn policy(&self) -> &FillPolicy {
        &self.policy
    }

    pub fn get_fillable(&self) -> &[Key] {
        &self.policy.fillable
    }

    pub fn set_fillable(&mut self, fillable: Vec<Key>) -> &mut Self {
        self.policy.fillable = fillable;
        self
    }

    pub fn get_required(&self) -> &[Key] {
        &self.policy.required
    }

    pub fn set_required(&mut self, required: Vec<Key>) -> &mut Self {
        self.policy.required = required;
        self
    }

    pub fn is_fillable(&self, key: impl Into<Key>) -> bool {
        self.policy.is_fillable(&key.into())
    }

    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }

    /// Apply the policy to an input mapping.
    fn fillable_and_required(&self, attributes: Attributes) -> Result<Attributes> {
        let missing = self.policy.missing(&attributes);
        if !missing.is_empty() {
            debug!(?missing, "fill rejected, required fields missing");
            return Err(CollectionError::MissingRequiredFields(missing));
        }

        if self.policy.fillable.is_empty() {
            return Ok(attributes);
        }

        Ok(attributes
            .into_iter()
            .filter(|(key, _)| {
                let keep = self.policy.is_fillable(key);
                if !keep {
                    debug!(%key, "dropping attribute that is not fillable");
                }
                keep
            })
            .collect())
    }
}

impl<D: ModelDefinition> Container for Model<D> {
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
        for (key, value) in self.fillable_and_required(attributes)? {
            self.set_attribute(key, value);
        }
        Ok(())
    }

    fn new_instance(&self, attributes: Attributes) -> Result<Self> {
        Self::with_policy(self.policy.clone(), attributes)
    }
}

impl<D: ModelDefinition> Clone for Model<D> {
    fn clone(&self) -> Self {
        Self {
            attributes: self.attributes.clone(),
            position: self.position,
            policy: self.policy.clone(),
            kind: PhantomData,
        }
    }
}

impl<D: ModelDefinition> fmt::Debug for Model<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("kind", &std::any::type_name::<D>())
            .field("attributes", &self.attributes)
            .field("policy", &self.policy)
            .finish()
    }
}

impl<D: ModelDefinition> PartialEq for Model<D> {
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
    }
}

impl<'a, D: ModelDefinition> IntoIterator for &'a Model<D> {
    type Item = (&'a Key, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}

impl<D: ModelDefinition> IntoIterator for Model<D> {
    type Item = (Key, Value);
    type IntoIter = indexmap::map::IntoIter<Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.into_iter()
    }
}

/// Serializes as the plain attribute mapping; the policy is not written.
impl<D: ModelDefinition> Serialize for Model<D> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.attributes.serialize(serializer)
    }
}

/// Deserializing runs the validated fill with `D`'s policy.
impl<'de, D: ModelDefinition> Deserialize<'de> for Model<D> {
    fn deserialize<De>(deserializer: De) -> std::result::Result<Self, De::Error>
    where
        De: Deserializer<'de>,
    {
        let attributes = Attributes::deserialize(deserializer)?;
        Self::new(attributes).map_err(serde::de::Error::custom)
    }
}

impl<K: Into<Key>, D: ModelDefinition> Index<K> for Model<D> {
    type Output = Value;

    fn index(&self, key: K) -> &Value {
        self.attributes.get(&key.into()).unwrap_or(&NULL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes;

    struct Person;

    impl ModelDefinition for Person {
        fn fillable() -> Vec<Key> {
            ["first_name", "last_name", "age", "sex", "active"]
                .into_iter()
                .map(Key::from)
                .collect()
        }

        fn required() -> Vec<Key> {
            vec!["first_name".into()]
        }
    }

    #[test]
    fn test_constructor() {
        let model =
            Model::<Person>::new(attributes([("first_name", "John"), ("last_name", "Doe")]))
                .unwrap();

        assert_eq!(model["first_name"], Value::from("John"));
        assert_eq!(model["last_name"], Value::from("Doe"));
    }

    #[test]
    fn test_required_exception() {
        let err = Model::<Person>::new(Attributes::new()).unwrap_err();
        assert_eq!(
            err,
            CollectionError::MissingRequiredFields(vec![Key::from("first_name")])
        );
        assert_eq!(err.to_string(), "Missing required fields: first_name");
    }

    #[test]
    fn test_fillable() {
        let model =
            Model::<Person>::new(attributes([("first_name", "John"), ("foo", "bar")])).unwrap();

        assert!(!model.is_fillable("foo"));
        assert!(model["foo"].is_null());
        assert!(!model.get_fillable().contains(&Key::from("foo")));
        assert_eq!(model.count(), 1);
    }

    #[test]
    fn empty_fillable_allows_everything() {
        let model = Model::<AdHoc>::new(attributes([("a", 1), ("b", 2)])).unwrap();
        assert!(model.is_fillable("anything"));
        assert_eq!(model.count(), 2);
    }

    #[test]
    fn every_missing_key_is_reported() {
        let policy = FillPolicy::new(vec![], vec!["a".into(), "b".into(), "c".into()]);
        let err = Model::<AdHoc>::with_policy(policy, attributes([("b", 1)])).unwrap_err();
        assert_eq!(
            err,
            CollectionError::MissingRequiredFields(vec![Key::from("a"), Key::from("c")])
        );
    }

    #[test]
    fn required_key_need_not_be_fillable() {
        let policy = FillPolicy::new(vec!["name".into()], vec!["token".into()]);
        let model = Model::<AdHoc>::with_policy(
            policy,
            attributes([("name", "x"), ("token", "secret")]),
        )
        .unwrap();
        assert!(!model.has_key("token"));
        assert!(model.has_key("name"));
    }

    #[test]
    fn refill_merges_and_revalidates() {
        let mut model = Model::<Person>::new(attributes([
            ("first_name", Value::from("John")),
            ("age", Value::from(45)),
        ]))
        .unwrap();

        model
            .fill(attributes([("first_name", "Jane"), ("last_name", "Roe")]))
            .unwrap();
        assert_eq!(model["first_name"], Value::from("Jane"));
        assert_eq!(model["age"], Value::Int(45));
        assert_eq!(model["last_name"], Value::from("Roe"));

        let err = model.fill(attributes([("age", 50)])).unwrap_err();
        assert!(matches!(err, CollectionError::MissingRequiredFields(_)));
        assert_eq!(model["age"], Value::Int(45));
    }

    #[test]
    fn setters_change_policy_for_next_fill() {
        let mut model = Model::<Person>::new(attributes([("first_name", "John")])).unwrap();
        model.set_fillable(vec![]).set_required(vec!["id".into()]);

        assert_eq!(model.get_required(), &[Key::from("id")]);
        assert!(model.is_fillable("foo"));
        assert!(model.fill(attributes([("foo", "bar")])).is_err());
        model
            .fill(attributes([("id", Value::from(1)), ("foo", Value::from("bar"))]))
            .unwrap();
        assert_eq!(model["foo"], Value::from("bar"));
    }

    #[test]
    fn transformations_keep_model_kind_and_policy() {
        let model = Model::<Person>::new(attributes([
            ("first_name", Value::from("John")),
            ("age", Value::from(45)),
        ]))
        .unwrap();

        let filtered: Model<Person> = model.filter(|v, _| v.as_str().is_some()).unwrap();
        assert_eq!(filtered.count(), 1);
        assert_eq!(filtered.get_fillable(), model.get_fillable());
    }

    #[test]
    fn transformation_dropping_required_key_fails() {
        let model = Model::<Person>::new(attributes([("first_name", "John"), ("age", "x")])).unwrap();
        let err = model.diff_keys(&attributes([("first_name", 0)])).unwrap_err();
        assert!(matches!(err, CollectionError::MissingRequiredFields(_)));
    }

    #[test]
    fn merge_is_filtered_by_policy() {
        let model = Model::<Person>::new(attributes([("first_name", "John")])).unwrap();
        let merged = model
            .merge(&attributes([("age", Value::from(45)), ("foo", Value::from("bar"))]))
            .unwrap();
        assert_eq!(merged["age"], Value::Int(45));
        assert!(!merged.has_key("foo"));
    }

    #[test]
    fn chunk_yields_plain_collections() {
        let model = Model::<Person>::new(attributes([
            ("first_name", Value::from("John")),
            ("last_name", Value::from("Doe")),
            ("age", Value::from(45)),
        ]))
        .unwrap();

        let chunks = model.chunk(2);
        assert_eq!(chunks.count(), 2);
        assert_eq!(chunks[1], Value::Map(attributes([("age", 45)])));
    }

    #[test]
    fn iterates_in_insertion_order() {
        let model = Model::<Person>::new(attributes([
            ("first_name", Value::from("John")),
            ("age", Value::from(45)),
        ]))
        .unwrap();

        let mut seen = Vec::new();
        for (key, _) in &model {
            seen.push(key.to_string());
        }
        assert_eq!(seen, vec!["first_name", "age"]);

        let owned: Vec<(Key, Value)> = model.into_iter().collect();
        assert_eq!(owned[1], (Key::from("age"), Value::Int(45)));
    }

    #[test]
    fn serde_writes_attributes_and_validates_on_read() {
        let model =
            Model::<Person>::new(attributes([("first_name", "John"), ("last_name", "Doe")]))
                .unwrap();
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#"{"first_name":"John","last_name":"Doe"}"#);

        let loaded: Model<Person> = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, model);

        let filtered: Model<Person> =
            serde_json::from_str(r#"{"first_name":"Jane","foo":"bar"}"#).unwrap();
        assert!(!filtered.has_key("foo"));

        let err = serde_json::from_str::<Model<Person>>(r#"{"age":45}"#).unwrap_err();
        assert!(err.to_string().contains("Missing required fields: first_name"));
    }

    #[test]
    fn cursor_works_on_models() {
        let mut model = Model::<Person>::new(attributes([
            ("first_name", Value::from("John")),
            ("last_name", Value::from("Doe")),
            ("age", Value::from(45)),
        ]))
        .unwrap();
        assert_eq!(model.first(), Some(&Value::from("John")));
        assert_eq!(model.last(), Some(&Value::Int(45)));
    }
}
