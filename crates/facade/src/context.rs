//! The application context: one storage medium, one lazily built store.

use hwt_adapters::{JsonFileStorage, MemoryStorage};
use hwt_config::{ConfigStore, Feature, RuntimeEnv, Site, run_migrations};
use hwt_ports::SharedStorage;
use hwt_state::{MapState, SetState, StateKey, TypedState};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Owns the storage medium and the config store for one process.
///
/// Construct once at startup and pass it (or the pieces it hands out) to
/// consumers. Construction runs the init migrations before anything reads
/// storage.
pub struct AppContext {
    storage: SharedStorage,
    store: Option<ConfigStore>,
}

impl AppContext {
    /// Wrap `storage` and run init migrations against it.
    pub fn new(storage: SharedStorage) -> Self {
        run_migrations(storage.as_ref());
        Self {
            storage,
            store: None,
        }
    }

    /// A context over a fresh session-only medium.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// A context over the JSON file named by `env`, or `fallback_path`.
    pub fn from_runtime_env(env: &RuntimeEnv, fallback_path: &Path) -> Self {
        Self::new(open_storage(env, fallback_path))
    }

    /// The shared medium.
    pub const fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    /// The config store, built from persisted data on first access.
    pub fn store(&mut self) -> &mut ConfigStore {
        let storage = &self.storage;
        self.store
            .get_or_insert_with(|| ConfigStore::new(Arc::clone(storage)))
    }

    /// Returns true once the store has been built.
    pub const fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Discard the store; the next [`store`](Self::store) call rebuilds it
    /// from storage. Listeners registered on the old store are dropped.
    pub fn reset_store(&mut self) {
        self.store = None;
    }

    /// Whether `feature` is on, optionally for one site.
    pub fn is_feature_enabled(&mut self, feature: Feature, site: Option<Site>) -> bool {
        self.store().is_feature_enabled(feature, site)
    }

    /// A typed state cell over this context's medium.
    pub fn typed_state<T>(&self, key: StateKey, default: T) -> TypedState<T>
    where
        T: Clone + Serialize + DeserializeOwned,
    {
        TypedState::new(Arc::clone(&self.storage), key, default)
    }

    /// A set cell over this context's medium.
    pub fn set_state<T>(&self, key: StateKey) -> SetState<T>
    where
        T: Ord + Clone + Serialize + DeserializeOwned + 'static,
    {
        SetState::new(Arc::clone(&self.storage), key)
    }

    /// A map cell over this context's medium.
    pub fn map_state<V>(&self, key: StateKey) -> MapState<V>
    where
        V: Clone + Serialize + DeserializeOwned + 'static,
    {
        MapState::new(Arc::clone(&self.storage), key)
    }
}

/// Open the JSON storage file named by `env`, or `fallback_path`.
pub fn open_storage(env: &RuntimeEnv, fallback_path: &Path) -> SharedStorage {
    let path = env
        .storage_path
        .clone()
        .unwrap_or_else(|| fallback_path.to_path_buf());
    debug!(
        target: "hwt::storage",
        path = %path.display(),
        read_only = env.storage_read_only,
        "opening storage file"
    );
    Arc::new(JsonFileStorage::new(path).read_only(env.storage_read_only))
}

impl fmt::Debug for AppContext {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AppContext")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
