//! Durable key-value storage boundary contract.
//!
//! The medium mirrors a browser key-value store: string keys map to string
//! values (JSON-encoded by callers), every call is synchronous and returns
//! immediately, and any call may fail (quota exceeded, storage disabled,
//! private mode). Callers are expected to absorb failures.

use hwt_shared::Result;
use std::sync::Arc;

/// Boundary contract for the persisted key-value medium.
pub trait StoragePort: Send + Sync {
    /// Read the raw value for `key`; `Ok(None)` when the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write the raw value for `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Deleting an absent key succeeds.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// List the keys currently present, sorted.
    fn keys(&self) -> Result<Vec<String>>;
}

impl<T> StoragePort for Arc<T>
where
    T: StoragePort + ?Sized,
{
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.as_ref().get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.as_ref().set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.as_ref().remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.as_ref().keys()
    }
}

/// Shared handle to a storage medium.
pub type SharedStorage = Arc<dyn StoragePort>;

/// Extension helpers for storage ports.
pub trait StoragePortExt {
    /// Read `key`, treating an empty string the same as an absent key.
    fn get_non_empty(&self, key: &str) -> Result<Option<String>>;

    /// Returns true when `key` holds a non-empty value.
    fn contains_key(&self, key: &str) -> Result<bool>;
}

impl<T> StoragePortExt for T
where
    T: StoragePort + ?Sized,
{
    fn get_non_empty(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_item(key)?.filter(|value| !value.is_empty()))
    }

    fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_non_empty(key)?.is_some())
    }
}
