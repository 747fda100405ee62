//! Single persisted cell with a default, an optional validator, and a
//! write-through cache.

use crate::key::StateKey;
use crate::validators::{self, Validator};
use hwt_ports::SharedStorage;
use hwt_shared::Validation;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// A typed state cell bound to one storage key.
///
/// The cell is loaded lazily on first access and cached until [`clear`] or
/// [`reset_cache`]. Every mutation updates the cache first and then tries to
/// persist; a failed write is logged and the cache stays authoritative for
/// the rest of the session.
///
/// [`clear`]: TypedState::clear
/// [`reset_cache`]: TypedState::reset_cache
pub struct TypedState<T> {
    storage: SharedStorage,
    key: StateKey,
    storage_key: String,
    default: T,
    validator: Option<Validator<T>>,
    cache: Option<T>,
}

impl<T> TypedState<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Create a cell that trusts any payload serde can decode into `T`.
    pub fn new(storage: SharedStorage, key: StateKey, default: T) -> Self {
        Self {
            storage,
            key,
            storage_key: key.storage_key(),
            default,
            validator: None,
            cache: None,
        }
    }

    /// Create a cell whose payload must pass `validator`.
    pub fn with_validator<F>(storage: SharedStorage, key: StateKey, default: T, validator: F) -> Self
    where
        F: Fn(&Value) -> Validation<T> + Send + Sync + 'static,
    {
        Self {
            validator: Some(Box::new(validator)),
            ..Self::new(storage, key, default)
        }
    }

    /// The cell name.
    pub const fn key(&self) -> StateKey {
        self.key
    }

    /// The full storage key.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// The configured default.
    pub const fn default_value(&self) -> &T {
        &self.default
    }

    /// Returns true when a value is cached.
    pub const fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Return the cached value, reading storage on first access.
    ///
    /// Never fails: an absent, empty, malformed, or rejected payload
    /// resolves to the default (malformed and rejected ones are logged).
    pub fn load(&mut self) -> &T {
        let value = match self.cache.take() {
            Some(value) => value,
            None => self.fetch(),
        };
        self.cache.insert(value)
    }

    /// Replace the value: cache first, then persist.
    pub fn save(&mut self, value: T) {
        let encoded = serde_json::to_string(&value);
        self.cache = Some(value);

        let encoded = match encoded {
            Ok(encoded) => encoded,
            Err(error) => {
                warn!(
                    target: "hwt::state",
                    key = %self.storage_key,
                    error = %error,
                    "failed to encode state; keeping in-memory value only"
                );
                return;
            },
        };
        if let Err(error) = self.storage.set_item(&self.storage_key, &encoded) {
            warn!(
                target: "hwt::state",
                key = %self.storage_key,
                error = %error,
                "failed to save state; keeping in-memory value only"
            );
        }
    }

    /// Read-modify-write. Not atomic across processes sharing the medium.
    pub fn update<F>(&mut self, updater: F)
    where
        F: FnOnce(T) -> T,
    {
        let current = self.load().clone();
        self.save(updater(current));
    }

    /// Drop the cache and delete the persisted key.
    pub fn clear(&mut self) {
        self.cache = None;
        if let Err(error) = self.storage.remove_item(&self.storage_key) {
            warn!(
                target: "hwt::state",
                key = %self.storage_key,
                error = %error,
                "failed to clear state"
            );
        }
    }

    /// Drop only the cache so the next access re-reads storage.
    pub fn reset_cache(&mut self) {
        self.cache = None;
    }

    fn fetch(&self) -> T {
        let raw = match self.storage.get_item(&self.storage_key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => {
                debug!(target: "hwt::state", key = %self.storage_key, "no stored state; using default");
                return self.default.clone();
            },
            Err(error) => {
                warn!(
                    target: "hwt::state",
                    key = %self.storage_key,
                    error = %error,
                    "failed to read state; using default"
                );
                return self.default.clone();
            },
        };

        let parsed: Value = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(error) => {
                warn!(
                    target: "hwt::state",
                    key = %self.storage_key,
                    error = %error,
                    "stored state is not valid JSON; using default"
                );
                return self.default.clone();
            },
        };

        let validation = self
            .validator
            .as_ref()
            .map_or_else(|| validators::decode(&parsed), |validate| validate(&parsed));
        match validation {
            Validation::Valid(value) => value,
            Validation::Invalid(reason) => {
                warn!(
                    target: "hwt::state",
                    key = %self.storage_key,
                    reason = %reason,
                    "invalid stored state; using default"
                );
                self.default.clone()
            },
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for TypedState<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TypedState")
            .field("key", &self.storage_key)
            .field("default", &self.default)
            .field("validated", &self.validator.is_some())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwt_adapters::MemoryStorage;
    use hwt_ports::StoragePort;
    use hwt_shared::Result;
    use hwt_testkit::{FaultyStorage, capture_logs};
    use std::sync::Arc;

    fn memory(items: &[(&str, &str)]) -> Arc<MemoryStorage> {
        Arc::new(MemoryStorage::with_items(items.iter().copied()))
    }

    #[test]
    fn missing_value_resolves_to_default() {
        let storage = memory(&[]);
        let mut state = TypedState::new(storage, StateKey::Visited, 7_u32);
        assert_eq!(*state.load(), 7);
        assert!(state.is_cached());
    }

    #[test]
    fn malformed_json_falls_back_and_warns() {
        let storage = memory(&[("hwt:state:lastVisit", "not json")]);
        let mut state = TypedState::new(storage, StateKey::LastVisit, 0_i64);

        let (value, logs) = capture_logs(|| *state.load());
        assert_eq!(value, 0);
        assert!(logs.contains("WARN"), "logs: {logs}");
        assert!(logs.contains("hwt:state:lastVisit"), "logs: {logs}");
    }

    #[test]
    fn validator_rejection_falls_back() {
        let storage = memory(&[("hwt:state:visited", "[1, 2]")]);
        let mut state = TypedState::with_validator(
            storage,
            StateKey::Visited,
            Vec::<String>::new(),
            validators::string_array,
        );
        assert!(state.load().is_empty());
    }

    #[test]
    fn save_writes_through() -> Result<()> {
        let storage = memory(&[]);
        let mut state = TypedState::new(Arc::clone(&storage) as SharedStorage, StateKey::Visited, 0_u32);
        state.save(3);
        assert_eq!(storage.get_item("hwt:state:visited")?.as_deref(), Some("3"));

        state.update(|current| current + 1);
        assert_eq!(*state.load(), 4);
        assert_eq!(storage.get_item("hwt:state:visited")?.as_deref(), Some("4"));
        Ok(())
    }

    #[test]
    fn failed_save_keeps_cache() {
        let storage = Arc::new(FaultyStorage::new());
        storage.fail_writes(true);
        let mut state = TypedState::new(Arc::clone(&storage) as SharedStorage, StateKey::Visited, 0_u32);

        let ((), logs) = capture_logs(|| state.save(9));
        assert_eq!(*state.load(), 9);
        assert!(logs.contains("failed to save state"), "logs: {logs}");

        state.reset_cache();
        assert_eq!(*state.load(), 0);
    }

    #[test]
    fn failed_read_falls_back() {
        let storage = Arc::new(FaultyStorage::new());
        storage.fail_reads(true);
        let mut state = TypedState::new(storage, StateKey::Bookmarks, 5_u8);
        assert_eq!(*state.load(), 5);
    }

    #[test]
    fn clear_removes_key_and_cache() -> Result<()> {
        let storage = memory(&[("hwt:state:visited", "2")]);
        let mut state = TypedState::new(Arc::clone(&storage) as SharedStorage, StateKey::Visited, 0_u32);
        assert_eq!(*state.load(), 2);

        state.clear();
        assert!(!state.is_cached());
        assert_eq!(storage.get_item("hwt:state:visited")?, None);
        assert_eq!(*state.load(), 0);
        Ok(())
    }

    #[test]
    fn reset_cache_rereads_external_changes() -> Result<()> {
        let storage = memory(&[("hwt:state:visited", "1")]);
        let mut state = TypedState::new(Arc::clone(&storage) as SharedStorage, StateKey::Visited, 0_u32);
        assert_eq!(*state.load(), 1);

        storage.set_item("hwt:state:visited", "8")?;
        assert_eq!(*state.load(), 1);

        state.reset_cache();
        assert_eq!(*state.load(), 8);
        Ok(())
    }
}
