//! Map-valued state persisted as a JSON object.

use crate::key::StateKey;
use crate::typed::TypedState;
use crate::validators;
use hwt_ports::SharedStorage;
use hwt_shared::Validation;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

/// A persisted string-keyed map.
#[derive(Debug)]
pub struct MapState<V> {
    inner: TypedState<BTreeMap<String, V>>,
}

impl<V> MapState<V>
where
    V: Clone + Serialize + DeserializeOwned + 'static,
{
    /// Create a map bound to `key`. Payloads that are not JSON objects, or
    /// whose values do not decode as `V`, resolve to the empty map.
    pub fn new(storage: SharedStorage, key: StateKey) -> Self {
        Self::with_value_validator(storage, key, validators::decode::<V>)
    }

    /// Create a map whose every value must pass `value_validator`.
    pub fn with_value_validator<F>(storage: SharedStorage, key: StateKey, value_validator: F) -> Self
    where
        F: Fn(&Value) -> Validation<V> + Send + Sync + 'static,
    {
        Self {
            inner: TypedState::with_validator(
                storage,
                key,
                BTreeMap::new(),
                validators::object_of(value_validator),
            ),
        }
    }

    /// The storage key backing this map.
    pub fn storage_key(&self) -> &str {
        self.inner.storage_key()
    }

    /// Look up `key`.
    pub fn get(&mut self, key: &str) -> Option<V> {
        self.inner.load().get(key).cloned()
    }

    /// Insert or replace `key`.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        self.inner.update(|mut entries| {
            entries.insert(key, value);
            entries
        });
    }

    /// Remove `key`; returns true when it was present. Persists only on
    /// change.
    pub fn delete(&mut self, key: &str) -> bool {
        if !self.has(key) {
            return false;
        }
        self.inner.update(|mut entries| {
            entries.remove(key);
            entries
        });
        true
    }

    /// Returns true when `key` is present.
    pub fn has(&mut self, key: &str) -> bool {
        self.inner.load().contains_key(key)
    }

    /// Snapshot of every entry in key order.
    pub fn entries(&mut self) -> Vec<(String, V)> {
        self.inner
            .load()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Number of entries.
    pub fn len(&mut self) -> usize {
        self.inner.load().len()
    }

    /// Returns true when the map has no entries.
    pub fn is_empty(&mut self) -> bool {
        self.inner.load().is_empty()
    }

    /// Empty the map and delete the persisted key.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Drop the cache so the next access re-reads storage.
    pub fn reset_cache(&mut self) {
        self.inner.reset_cache();
    }
}
