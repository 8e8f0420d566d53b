//! Total, defaulting accessors over a loosely-typed YAML mapping.
//!
//! Normalizers read every field through [`Fields`]; nothing here fails. A
//! value of the wrong shape is coerced when a sensible reading exists and is
//! treated as absent otherwise, with a `log::warn!` in both cases.

use crate::document::value_kind;
use serde_yaml::{Mapping, Value};

/// Read-only view over one YAML mapping.
#[derive(Clone, Copy)]
pub struct Fields<'a> {
    map: &'a Mapping,
}

static EMPTY: std::sync::LazyLock<Mapping> = std::sync::LazyLock::new(Mapping::new);

impl<'a> Fields<'a> {
    /// Wraps a mapping.
    pub fn new(map: &'a Mapping) -> Self {
        Self { map }
    }

    /// A view with no keys; every accessor returns its default.
    pub fn empty() -> Fields<'static> {
        Fields { map: &EMPTY }
    }

    /// Wraps `value` when it is a mapping, otherwise returns `None`.
    pub fn of(value: &'a Value) -> Option<Self> {
        as_mapping(value).map(Self::new)
    }

    /// Returns the value under `key`, treating an explicit `null` as absent.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|value| !value.is_null())
    }

    /// Returns the first present key from `keys`, in order.
    ///
    /// The first key wins even when later aliases hold different values.
    pub fn first_present(&self, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
        let found = keys
            .iter()
            .find_map(|key| self.get(key).map(|value| (*key, value)));
        if let Some((key, _)) = found
            && keys.first() != Some(&key)
        {
            log::debug!("field `{}` resolved through alias `{}`", keys[0], key);
        }
        found
    }

    /// Text under `key`, or an empty string.
    pub fn text(&self, key: &str) -> String {
        self.opt_text(key).unwrap_or_default()
    }

    /// Text under `key`; absent, null, and empty strings are `None`.
    pub fn opt_text(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(|value| scalar_text(value, key))
            .filter(|text| !text.is_empty())
    }

    /// Text under the first present key of `keys`.
    pub fn opt_text_any(&self, keys: &[&'static str]) -> Option<String> {
        self.first_present(keys)
            .and_then(|(key, value)| scalar_text(value, key))
            .filter(|text| !text.is_empty())
    }

    /// Non-negative integer under `key`.
    ///
    /// Numeric strings such as `"50"` are accepted; fractional numbers are
    /// truncated.
    pub fn uint(&self, key: &str) -> Option<u32> {
        let value = self.get(key)?;
        let parsed = match value {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            log::warn!(
                "field `{}`: expected a non-negative integer, found {}",
                key,
                value_kind(value)
            );
        }
        parsed.and_then(|n| u32::try_from(n).ok())
    }

    /// Boolean under `key`; numbers count as true when non-zero.
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
            Value::String(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => {
                    log::warn!("field `{}`: expected a boolean, found {:?}", key, s);
                    None
                }
            },
            other => {
                log::warn!(
                    "field `{}`: expected a boolean, found {}",
                    key,
                    value_kind(other)
                );
                None
            }
        }
    }

    /// List of non-empty strings under `key`.
    ///
    /// A bare scalar is wrapped into a single-element list.
    pub fn text_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|value| text_list_of(value, key))
            .unwrap_or_default()
    }

    /// List of non-empty strings under the first present key of `keys`.
    pub fn text_list_any(&self, keys: &[&'static str]) -> Vec<String> {
        self.first_present(keys)
            .map(|(key, value)| text_list_of(value, key))
            .unwrap_or_default()
    }

    /// Elements of the sequence under `key`; a lone non-sequence value is
    /// treated as a one-element sequence.
    pub fn items(&self, key: &str) -> Vec<&'a Value> {
        match self.get(key) {
            None => Vec::new(),
            Some(Value::Sequence(seq)) => seq.iter().collect(),
            Some(other) => {
                log::warn!(
                    "field `{}`: expected a list, found {}; wrapping",
                    key,
                    value_kind(other)
                );
                vec![other]
            }
        }
    }

    /// Elements of the sequence under the first present key of `keys`.
    pub fn items_any(&self, keys: &[&'static str]) -> Vec<&'a Value> {
        match self.first_present(keys) {
            Some((key, _)) => self.items(key),
            None => Vec::new(),
        }
    }

    /// Nested mapping under `key`.
    pub fn mapping(&self, key: &str) -> Option<Fields<'a>> {
        let value = self.get(key)?;
        let nested = Self::of(value);
        if nested.is_none() {
            log::warn!(
                "field `{}`: expected a mapping, found {}",
                key,
                value_kind(value)
            );
        }
        nested
    }

    /// Iterates the underlying entries in document order.
    pub fn entries(self) -> impl Iterator<Item = (&'a Value, &'a Value)> + 'a {
        self.map.iter()
    }
}

/// Returns the mapping inside `value`, looking through YAML tags.
pub fn as_mapping(value: &Value) -> Option<&Mapping> {
    match value {
        Value::Mapping(map) => Some(map),
        Value::Tagged(tagged) => as_mapping(&tagged.value),
        _ => None,
    }
}

/// Renders a scalar value as text. Non-scalars yield `None`.
pub fn scalar_text(value: &Value, key: &str) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        Value::Tagged(tagged) => scalar_text(&tagged.value, key),
        other => {
            log::warn!(
                "field `{}`: expected text, found {}",
                key,
                value_kind(other)
            );
            None
        }
    }
}

/// Renders a mapping key as text.
pub fn key_text(key: &Value) -> String {
    scalar_text(key, "<key>").unwrap_or_default()
}

fn text_list_of(value: &Value, key: &str) -> Vec<String> {
    match value {
        Value::Sequence(seq) => seq
            .iter()
            .filter_map(|item| scalar_text(item, key))
            .filter(|text| !text.is_empty())
            .collect(),
        other => scalar_text(other, key)
            .filter(|text| !text.is_empty())
            .into_iter()
            .collect(),
    }
}
