//! JSON-file backed storage medium.
//!
//! The whole medium is one JSON object (`{ "<key>": "<raw value>" }`) on
//! disk. Every call re-reads the file so writes from another process are
//! visible on the next read; concurrent writers are last-writer-wins.

use hwt_ports::StoragePort;
use hwt_shared::{ErrorCode, ErrorEnvelope, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Durable medium stored as a single JSON document.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    read_only: bool,
    lock: Mutex<()>,
}

impl JsonFileStorage {
    /// Open (lazily) the medium at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_only: false,
            lock: Mutex::new(()),
        }
    }

    /// Reject every write with a permission-denied error, emulating a
    /// disabled storage medium.
    #[must_use]
    pub const fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| ErrorEnvelope::internal("file storage lock poisoned"))
    }

    fn ensure_writable(&self, key: &str) -> Result<()> {
        if self.read_only {
            return Err(ErrorEnvelope::storage_unavailable("storage is read-only")
                .with_metadata("key", key)
                .with_metadata("path", self.path.display().to_string()));
        }
        Ok(())
    }

    fn read_document(&self) -> Result<BTreeMap<String, String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            },
            Err(error) => {
                return Err(ErrorEnvelope::from(error)
                    .with_metadata("path", self.path.display().to_string()));
            },
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("storage", "corrupt_document"),
                format!("storage file is not a JSON string map: {error}"),
            )
            .with_metadata("path", self.path.display().to_string())
        })
    }

    fn write_document(&self, document: &BTreeMap<String, String>) -> Result<()> {
        let encoded = serde_json::to_string_pretty(document).map_err(|error| {
            ErrorEnvelope::internal(format!("failed to encode storage document: {error}"))
        })?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(ErrorEnvelope::from)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, encoded).map_err(ErrorEnvelope::from)?;
        fs::rename(&tmp_path, &self.path).map_err(ErrorEnvelope::from)?;
        debug!(
            target: "hwt::storage",
            path = %self.path.display(),
            entries = document.len(),
            "storage document written"
        );
        Ok(())
    }
}

impl StoragePort for JsonFileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.guard()?;
        Ok(self.read_document()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_writable(key)?;
        let _guard = self.guard()?;
        let mut document = self.read_document()?;
        document.insert(key.to_owned(), value.to_owned());
        self.write_document(&document)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.ensure_writable(key)?;
        let _guard = self.guard()?;
        let mut document = self.read_document()?;
        if document.remove(key).is_none() {
            return Ok(());
        }
        self.write_document(&document)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let _guard = self.guard()?;
        Ok(self.read_document()?.into_keys().collect())
    }
}
