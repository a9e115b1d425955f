//! Option tables shared by the request DSL, hosts and hooks.
//!
//! [`Options`] is an ordered map from option key to a JSON value. The same
//! type carries three different tables:
//!
//! - the **defaults table** built by the request DSL (plugin name → default)
//! - a host's **runtime options** passed to [`Host::instantiate`](crate::host::Host::instantiate)
//! - the **option slice** handed to hooks that asked for it
//!
//! Keys are kept sorted so that iteration and serialisation are deterministic.
//!
//! # Example
//!
//! ```
//! use pluggable_system::options::Options;
//! use serde_json::json;
//!
//! let options: Options = serde_json::from_value(json!({
//!     "cache": true,
//!     "fallbacks": { "de": "en" },
//! }))
//! .unwrap();
//!
//! let slice = options.slice(["cache"]);
//! assert_eq!(slice.len(), 1);
//! assert_eq!(slice.get("cache"), Some(&json!(true)));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An ordered table of option values keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options {
    entries: BTreeMap<String, Value>,
}

impl Options {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Iterates keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Copies every entry of `other` into this table. Entries of `other` win.
    pub fn merge(&mut self, other: &Options) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// Returns a new table holding `self` overlaid with `other`.
    #[must_use]
    pub fn merged(&self, other: &Options) -> Options {
        let mut merged = self.clone();
        merged.merge(other);
        merged
    }

    /// Returns the subset of entries whose key is one of `keys`.
    #[must_use]
    pub fn slice<I, K>(&self, keys: I) -> Options
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let entries = keys
            .into_iter()
            .filter_map(|key| {
                let key = key.as_ref();
                self.entries
                    .get(key)
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect();
        Options { entries }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Options {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Options {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Options {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl IntoIterator for Options {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_prefers_incoming_values() {
        let mut base = Options::from([("cache", json!(false)), ("presence", json!(true))]);
        base.merge(&Options::from([("cache", json!(true))]));

        assert_eq!(base.get("cache"), Some(&json!(true)));
        assert_eq!(base.get("presence"), Some(&json!(true)));
    }

    #[test]
    fn slice_ignores_missing_keys() {
        let options = Options::from([("cache", json!(true)), ("dirty", json!(true))]);
        let slice = options.slice(["cache", "fallbacks"]);

        assert_eq!(slice, Options::from([("cache", json!(true))]));
    }

    #[test]
    fn round_trips_through_json_as_a_plain_object() {
        let options = Options::new().with("default", "fast");
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value, json!({ "default": "fast" }));

        let parsed: Options = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, options);
    }

    #[test]
    fn iteration_is_key_ordered() {
        let options = Options::from([("z", 1), ("a", 2), ("m", 3)]);
        let keys: Vec<_> = options.keys().collect();
        assert_eq!(keys, ["a", "m", "z"]);
    }
}
