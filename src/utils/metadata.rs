use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::consts::MAX_METADATA_ENTRIES;

/// Bounded scratch map for ad hoc per-invocation data.
///
/// Typed state fields are the place for anything a node depends on; this map only holds
/// values that end up in the response envelope's metadata. Inserts of new keys past
/// [`MAX_METADATA_ENTRIES`] are refused, overwriting an existing key always succeeds.
/// Deserializing a larger map is an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, Value>);

impl<'de> Deserialize<'de> for Metadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, Value>::deserialize(deserializer)?;
        if entries.len() > MAX_METADATA_ENTRIES {
            return Err(de::Error::custom(format!(
                "metadata has {} entries, at most {} are allowed",
                entries.len(),
                MAX_METADATA_ENTRIES
            )));
        }
        Ok(Self(entries))
    }
}

impl Metadata {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a value, returning `false` if the map is full and `key` is new.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        if self.0.len() >= MAX_METADATA_ENTRIES && !self.0.contains_key(&key) {
            return false;
        }
        self.0.insert(key, value.into());
        true
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Merge `extra` into `base` with every key prefixed as `"{prefix}_{key}"`.
///
/// Returns the keys that did not fit.
///
/// # Example
///
/// ```rust
/// use lessonflow::utils::{merge_metadata_with_prefix, Metadata};
///
/// let mut base = Metadata::new();
/// base.insert("own_key", "own_value");
///
/// let mut params = Metadata::new();
/// params.insert("topic", "recursion");
///
/// let dropped = merge_metadata_with_prefix(&mut base, "param", &params);
///
/// assert!(dropped.is_empty());
/// assert_eq!(base.get_str("own_key"), Some("own_value"));
/// assert_eq!(base.get_str("param_topic"), Some("recursion"));
/// ```
pub fn merge_metadata_with_prefix(base: &mut Metadata, prefix: &str, extra: &Metadata) -> Vec<String> {
    let mut dropped = Vec::new();
    for (key, value) in extra.iter() {
        let prefixed_key = format!("{}_{}", prefix, key);
        if !base.insert(prefixed_key.clone(), value.clone()) {
            dropped.push(prefixed_key);
        }
    }
    dropped
}
