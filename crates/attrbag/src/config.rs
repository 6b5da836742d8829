//! # Fill Policy Configuration
//!
//! A [`FillPolicy`] is the pair of key lists a model enforces when it is
//! filled. Model definitions hand one out in code; it can also be loaded from
//! TOML through [`confique`], so a model's whitelist can live next to the rest
//! of an application's configuration.
//!
//! ## Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `fillable` | `[]` | Keys kept by `fill`. Empty keeps every key. |
//! | `required` | `[]` | Keys that must be present in every `fill`. |
//!
//! ```toml
//! fillable = ["first_name", "last_name", "age"]
//! required = ["first_name"]
//! ```

use std::path::Path;

use confique::Config;
use serde::{Deserialize, Serialize};

use crate::error::{CollectionError, Result};
use crate::key::Key;
use crate::Attributes;

/// Required/fillable policy enforced by a model.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct FillPolicy {
    /// Keys kept by `fill`; an empty list keeps every key.
    #[config(default = [])]
    #[serde(default)]
    pub fillable: Vec<Key>,

    /// Keys that must be present in the input to `fill`.
    #[config(default = [])]
    #[serde(default)]
    pub required: Vec<Key>,
}

impl FillPolicy {
    pub fn new(fillable: Vec<Key>, required: Vec<Key>) -> Self {
        Self { fillable, required }
    }

    /// Load a policy from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder()
            .file(path.as_ref())
            .load()
            .map_err(|e| CollectionError::Config(e.to_string()))
    }

    /// Parse a policy from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| CollectionError::Config(e.to_string()))
    }

    /// Commented TOML template listing every setting.
    pub fn template() -> String {
        confique::toml::template::<Self>(confique::toml::FormatOptions::default())
    }

    /// `key` is fillable when listed, or when nothing is listed.
    pub fn is_fillable(&self, key: &Key) -> bool {
        self.fillable.is_empty() || self.fillable.contains(key)
    }

    /// Required keys absent from `attributes`, in declaration order.
    pub fn missing(&self, attributes: &Attributes) -> Vec<Key> {
        self.required
            .iter()
            .filter(|key| !attributes.contains_key(*key))
            .cloned()
            .collect()
    }
}
