//! Pure operators over [`Attributes`].
//!
//! These functions hold the positional arithmetic behind `splice`, `slice`,
//! `merge`, `pad` and friends. They know nothing about containers or the
//! `new_instance` factory; [`Container`](super::Container) wraps their results.
//!
//! ## Key Renumbering
//!
//! Operators that shift entries around (`splice`, `merge`, `pad`) renumber
//! index keys from zero in the order they end up in, while name keys travel
//! with their values. Operators that only select entries (`slice`, `filter`,
//! `reverse`) keep every key as it was.

use tracing::warn;

use crate::error::{CollectionError, Result};
use crate::key::Key;
use crate::value::Value;
use crate::Attributes;

/// Next free index key: one past the largest index key, or zero.
pub fn next_index(attributes: &Attributes) -> usize {
    attributes
        .keys()
        .filter_map(Key::as_index)
        .max()
        .map_or(0, |max| max + 1)
}

/// Append a value under the next free index key.
pub fn append(attributes: &mut Attributes, value: Value) {
    let key = Key::Index(next_index(attributes));
    attributes.insert(key, value);
}

/// Rebuild a mapping from entries, renumbering index keys from zero.
///
/// Name keys are inserted as-is; a repeated name overwrites the earlier value
/// but keeps its original position.
pub fn renumbered<I>(entries: I) -> Attributes
where
    I: IntoIterator<Item = (Key, Value)>,
{
    let mut out = Attributes::new();
    let mut next = 0;
    for (key, value) in entries {
        match key {
            Key::Index(_) => {
                out.insert(Key::Index(next), value);
                next += 1;
            }
            name => {
                out.insert(name, value);
            }
        }
    }
    out
}

/// Resolve an `(offset, length)` window into a `start..end` range.
///
/// A negative offset counts from the end. A missing length runs to the end;
/// a negative length stops that many entries before the end.
pub fn window(len: usize, offset: isize, length: Option<isize>) -> (usize, usize) {
    let len_i = len as isize;
    let start = if offset < 0 {
        (len_i + offset).max(0)
    } else {
        offset.min(len_i)
    };
    let end = match length {
        None => len_i,
        Some(l) if l < 0 => (len_i + l).max(start),
        Some(l) => start.saturating_add(l).min(len_i),
    };
    (start as usize, end.max(start) as usize)
}

/// Copy of the entries inside the window, keys preserved.
pub fn slice(attributes: &Attributes, offset: isize, length: Option<isize>) -> Attributes {
    let (start, end) = window(attributes.len(), offset, length);
    attributes
        .iter()
        .skip(start)
        .take(end - start)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Remove the window from `attributes`, inserting `replacement` in its place.
///
/// Returns the removed entries. Both the remaining and the removed mapping
/// have their index keys renumbered.
pub fn splice(
    attributes: &mut Attributes,
    offset: isize,
    length: Option<isize>,
    replacement: Vec<Value>,
) -> Attributes {
    let (start, end) = window(attributes.len(), offset, length);
    let mut entries: Vec<(Key, Value)> = std::mem::take(attributes).into_iter().collect();
    let tail = entries.split_off(end);
    let removed = entries.split_off(start);

    let inserted = replacement.into_iter().map(|v| (Key::Index(0), v));
    *attributes = renumbered(entries.into_iter().chain(inserted).chain(tail));
    renumbered(removed)
}

/// Receiver entries followed by `other`'s; index keys are appended, names overwrite.
pub fn merge(attributes: &Attributes, other: &Attributes) -> Attributes {
    renumbered(
        attributes
            .iter()
            .chain(other.iter())
            .map(|(k, v)| (k.clone(), v.clone())),
    )
}

/// Pad to `|size|` entries with `value`; a negative size pads on the left.
pub fn pad(attributes: &Attributes, size: isize, value: &Value) -> Attributes {
    let target = size.unsigned_abs();
    if target <= attributes.len() {
        return attributes.clone();
    }
    let padding = (0..target - attributes.len()).map(|_| (Key::Index(0), value.clone()));
    let existing = attributes.iter().map(|(k, v)| (k.clone(), v.clone()));
    if size < 0 {
        renumbered(padding.chain(existing))
    } else {
        renumbered(existing.chain(padding))
    }
}

/// Use the receiver's values as keys for `values`, positionally.
pub fn combine(attributes: &Attributes, values: Vec<Value>) -> Result<Attributes> {
    if attributes.len() != values.len() {
        return Err(CollectionError::LengthMismatch {
            keys: attributes.len(),
            values: values.len(),
        });
    }
    attributes
        .values()
        .zip(values)
        .map(|(k, v)| Ok::<_, CollectionError>((Key::try_from(k)?, v)))
        .collect()
}

/// Swap keys and values. Values that cannot be keys are skipped.
pub fn flip(attributes: &Attributes) -> Attributes {
    let mut out = Attributes::new();
    for (key, value) in attributes {
        match Key::try_from(value) {
            Ok(flipped) => {
                out.insert(flipped, Value::from(key.clone()));
            }
            Err(_) => warn!(%key, ?value, "skipping value that cannot be flipped into a key"),
        }
    }
    out
}

/// Consecutive groups of at most `size` entries, keys preserved.
pub fn chunk(attributes: &Attributes, size: usize) -> Vec<Attributes> {
    if size == 0 {
        return Vec::new();
    }
    let entries: Vec<(&Key, &Value)> = attributes.iter().collect();
    entries
        .chunks(size)
        .map(|group| {
            group
                .iter()
                .map(|(k, v)| ((*k).clone(), (*v).clone()))
                .collect()
        })
        .collect()
}
