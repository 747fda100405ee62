//! Session-only storage medium.
//!
//! Used when no durable medium is configured, and as the default medium in
//! tests. An optional byte quota emulates a full browser store.

use hwt_ports::StoragePort;
use hwt_shared::{ErrorEnvelope, Result};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory key-value medium.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    /// Create an empty medium without a quota.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty medium that rejects writes past `quota_bytes`
    /// (sum of key and value lengths).
    #[must_use]
    pub fn with_quota_bytes(quota_bytes: usize) -> Self {
        Self {
            items: RwLock::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Seed the medium with raw entries.
    #[must_use]
    pub fn with_items<I, K, V>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let items = items
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            items: RwLock::new(items),
            quota_bytes: None,
        }
    }

    /// Snapshot every entry.
    pub fn snapshot(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, String>>> {
        self.items.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, String>>> {
        self.items.write().map_err(|_| poisoned())
    }
}

impl StoragePort for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.write()?;
        if let Some(quota) = self.quota_bytes {
            let used: usize = items
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(existing, stored)| existing.len() + stored.len())
                .sum();
            let needed = used + key.len() + value.len();
            if needed > quota {
                return Err(ErrorEnvelope::quota_exceeded("storage quota exceeded")
                    .with_metadata("key", key)
                    .with_metadata("quotaBytes", quota.to_string())
                    .with_metadata("neededBytes", needed.to_string()));
            }
        }
        items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.write()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.read()?.keys().cloned().collect())
    }
}

fn poisoned() -> ErrorEnvelope {
    ErrorEnvelope::internal("memory storage lock poisoned")
}
