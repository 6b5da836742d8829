use thiserror::Error;

use crate::key::{join_keys, Key};
use crate::value::Value;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollectionError {
    #[error("Missing required fields: {}", join_keys(.0))]
    MissingRequiredFields(Vec<Key>),

    #[error("Cannot combine {keys} keys with {values} values")]
    LengthMismatch { keys: usize, values: usize },

    #[error("Value cannot be used as a key: {0:?}")]
    InvalidKey(Value),

    #[error("Expected a mapping, got {0:?}")]
    NotAMapping(Value),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CollectionError>;
