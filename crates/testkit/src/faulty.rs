//! Storage adapter with switchable failures.

use hwt_ports::StoragePort;
use hwt_shared::Result;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::errors::{quota_error, unavailable_error};

/// In-memory storage whose reads, writes, and removals can be made to fail.
///
/// Failed writes report a quota error and leave the stored value untouched.
/// Failed reads and removals report the medium as unavailable.
#[derive(Debug, Default)]
pub struct FaultyStorage {
    items: Mutex<BTreeMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_removes: AtomicBool,
    writes: AtomicUsize,
}

impl FaultyStorage {
    /// Empty storage with no failures armed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage seeded with `items`.
    pub fn with_items<'a>(items: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let storage = Self::new();
        {
            let mut guard = storage.items.lock().unwrap();
            for (key, value) in items {
                guard.insert(key.to_string(), value.to_string());
            }
        }
        storage
    }

    /// Arm or disarm read failures.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Arm or disarm write failures.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Arm or disarm removal failures.
    pub fn fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw stored value, bypassing failure injection.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.lock().unwrap().get(key).cloned()
    }

    /// Copy of every stored entry.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.items.lock().unwrap().clone()
    }
}

impl StoragePort for FaultyStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable_error());
        }
        Ok(self.items.lock().unwrap().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(quota_error());
        }
        self.items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(unavailable_error());
        }
        self.items.lock().unwrap().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable_error());
        }
        Ok(self.items.lock().unwrap().keys().cloned().collect())
    }
}
