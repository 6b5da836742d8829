//! # attrbag
//!
//! Ordered attribute bags with a fluent operator library, plus models that
//! whitelist and require attributes when they are filled.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Model<D> (model.rs)                                        │
//! │  - Required / fillable policy per model definition          │
//! │  - Validating fill, MissingRequiredFields                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Container trait + Collection (collection/mod.rs)           │
//! │  - Cursor, keyed access, mutators                           │
//! │  - map / filter / diff / merge / partition / sort / ...     │
//! │  - new_instance keeps the concrete kind across transforms   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Pure operators (collection/ops.rs)                         │
//! │  - splice / slice / merge / pad / combine / flip / chunk    │
//! │  - Work on plain Attributes, no container knowledge         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Data
//!
//! An [`Attributes`] mapping is an insertion-ordered map from [`Key`] (a name
//! or an index) to a dynamic [`Value`]. Bags own their mapping; cloning a bag
//! copies it.
//!
//! ## Example
//!
//! ```
//! use attrbag::{attributes, Attributes, Container, Key, Model, ModelDefinition};
//!
//! struct Person;
//!
//! impl ModelDefinition for Person {
//!     fn fillable() -> Vec<Key> {
//!         vec!["first_name".into(), "last_name".into()]
//!     }
//!
//!     fn required() -> Vec<Key> {
//!         vec!["first_name".into()]
//!     }
//! }
//!
//! let person = Model::<Person>::new(attributes([("first_name", "John"), ("foo", "bar")])).unwrap();
//! assert_eq!(person["first_name"].as_str(), Some("John"));
//! assert!(!person.has_key("foo"));
//!
//! assert!(Model::<Person>::new(Attributes::new()).is_err());
//! ```
//!
//! ## Module Overview
//!
//! - [`collection`]: the [`Container`] trait and [`Collection`]
//! - [`model`]: [`Model`], [`ModelDefinition`]
//! - [`config`]: [`FillPolicy`], loadable from TOML
//! - [`key`], [`value`]: the key and value types
//! - [`error`]: [`CollectionError`]

pub mod collection;
pub mod config;
pub mod error;
pub mod key;
pub mod model;
pub mod value;

pub use collection::{Collection, Container};
pub use config::FillPolicy;
pub use error::{CollectionError, Result};
pub use key::Key;
pub use model::{AdHoc, Model, ModelDefinition};
pub use value::Value;

/// Insertion-ordered mapping held by every bag.
pub type Attributes = indexmap::IndexMap<Key, Value>;

/// Build an [`Attributes`] mapping from key/value pairs.
pub fn attributes<I, K, V>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<Key>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
