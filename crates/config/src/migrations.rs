//! Forward migration of the persisted preference blob, plus the one-time
//! bridge from the legacy collapse key into the state-cell format.

use crate::schema::CONFIG_VERSION;
use hwt_ports::StoragePort;
use hwt_shared::{ErrorEnvelope, Result};
use hwt_state::{CommentId, StateKey};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Storage key written by the pre-versioned collapse feature.
pub const LEGACY_COLLAPSE_KEY: &str = "hwc-collapsed";

/// Persisted preference blob: a schema version and sparse overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredConfig {
    /// Schema version the overrides were written with.
    #[serde(default)]
    pub version: u32,
    /// Sparse overrides, kept raw so steps can reshape them.
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl StoredConfig {
    /// An empty blob at the current version.
    #[must_use]
    pub fn current_empty() -> Self {
        Self {
            version: CONFIG_VERSION,
            config: Map::new(),
        }
    }
}

/// Transform applied to move overrides from one version to the next.
type MigrationStep = fn(Map<String, Value>) -> Map<String, Value>;

/// Step that upgrades from `version` to `version + 1`, if one is known.
fn migration_step(version: u32) -> Option<MigrationStep> {
    match version {
        0 => Some(unversioned_to_v1 as MigrationStep),
        _ => None,
    }
}

// Unversioned blobs already match the v1 layout.
const fn unversioned_to_v1(config: Map<String, Value>) -> Map<String, Value> {
    config
}

/// Bring `stored` up to [`CONFIG_VERSION`].
///
/// Each known step runs in order and bumps the version by one. A version
/// with no known step, or one newer than this build understands, discards
/// the overrides and returns an empty blob at the current version.
#[must_use]
pub fn migrate_config(stored: StoredConfig) -> StoredConfig {
    let StoredConfig {
        mut version,
        mut config,
    } = stored;

    if version > CONFIG_VERSION {
        warn!(
            target: "hwt::migrate",
            version,
            current = CONFIG_VERSION,
            "config written by a newer version; resetting to defaults"
        );
        return StoredConfig::current_empty();
    }

    while version < CONFIG_VERSION {
        let Some(step) = migration_step(version) else {
            warn!(
                target: "hwt::migrate",
                version,
                "unknown config version; resetting to defaults"
            );
            return StoredConfig::current_empty();
        };
        debug!(target: "hwt::migrate", from = version, "migrating config");
        config = step(config);
        version += 1;
    }

    StoredConfig { version, config }
}

/// Move ids saved under [`LEGACY_COLLAPSE_KEY`] into the collapse state cell.
///
/// Existing new-format data wins and the legacy key is simply dropped.
/// Malformed legacy data is dropped with a warning. Entries that are not
/// numeric comment ids are filtered out. When storage itself fails the
/// legacy key is left in place so a later run can retry.
pub fn migrate_legacy_collapse_state(storage: &dyn StoragePort) {
    if let Err(error) = try_migrate_legacy_collapse(storage) {
        warn!(
            target: "hwt::migrate",
            error = %error,
            "failed to migrate legacy collapse data"
        );
    }
}

fn try_migrate_legacy_collapse(storage: &dyn StoragePort) -> Result<()> {
    let legacy = match storage.get_item(LEGACY_COLLAPSE_KEY)? {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(()),
    };

    let new_key = StateKey::Collapse.storage_key();
    if storage
        .get_item(&new_key)?
        .is_some_and(|existing| !existing.is_empty())
    {
        storage.remove_item(LEGACY_COLLAPSE_KEY)?;
        debug!(target: "hwt::migrate", "cleaned up legacy collapse data");
        return Ok(());
    }

    let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(&legacy) else {
        warn!(target: "hwt::migrate", "legacy collapse data has invalid format");
        storage.remove_item(LEGACY_COLLAPSE_KEY)?;
        return Ok(());
    };

    let ids: Vec<CommentId> = entries
        .iter()
        .filter_map(Value::as_str)
        .filter_map(CommentId::parse)
        .collect();
    let encoded =
        serde_json::to_string(&ids).map_err(|error| ErrorEnvelope::internal(error.to_string()))?;

    storage.set_item(&new_key, &encoded)?;
    storage.remove_item(LEGACY_COLLAPSE_KEY)?;
    debug!(
        target: "hwt::migrate",
        count = ids.len(),
        "migrated collapsed comments to new format"
    );
    Ok(())
}

/// Init-time migrations that run before any store or state cell is used.
pub fn run_migrations(storage: &dyn StoragePort) {
    migrate_legacy_collapse_state(storage);
}
