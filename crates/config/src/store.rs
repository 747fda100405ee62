//! The observable preference store.

use crate::errors::{ConfigError, ImportError};
use crate::listeners::{ListenerRegistry, Subscription, invoke_leaf, invoke_section};
use crate::migrations::{StoredConfig, migrate_config};
use crate::overrides::{ConfigOverrides, merge};
use crate::schema::{
    CONFIG_VERSION, ConfigSection, DisplayKey, Feature, Site, SiteConfig, Threshold, UserConfig,
    default_config,
};
use crate::value::{ConfigKey, ConfigValue, SectionValue};
use hwt_ports::SharedStorage;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, error, warn};

/// Storage key of the persisted preference blob.
pub const STORAGE_KEY: &str = "hwt:config";

#[derive(Serialize)]
struct PersistedConfig<'a> {
    version: u32,
    config: &'a ConfigOverrides,
}

/// Defaults merged with persisted overrides, with change notification.
///
/// Storage failures never surface from the store: reads fall back to
/// defaults and failed writes are logged while the in-memory state stays
/// authoritative. Two stores over one medium do not see each other's
/// writes until reconstructed.
pub struct ConfigStore {
    storage: SharedStorage,
    defaults: UserConfig,
    config: UserConfig,
    overrides: ConfigOverrides,
    listeners: ListenerRegistry,
}

impl ConfigStore {
    /// Build a store from whatever is persisted in `storage`.
    pub fn new(storage: SharedStorage) -> Self {
        let defaults = default_config();
        let mut store = Self {
            storage,
            config: defaults.clone(),
            defaults,
            overrides: ConfigOverrides::default(),
            listeners: ListenerRegistry::default(),
        };
        if let Some(overrides) = store.load() {
            store.config = merge(&store.defaults, &overrides);
            store.overrides = overrides;
        }
        store
    }

    /// Read persisted overrides, migrating (and re-persisting) older or
    /// unknown versions. Returns `None` when nothing usable is stored.
    fn load(&self) -> Option<ConfigOverrides> {
        let raw = match self.storage.get_item(STORAGE_KEY) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(error) => {
                warn!(target: "hwt::config", error = %error, "failed to read config; using defaults");
                return None;
            },
        };

        let stored: StoredConfig = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(error) => {
                warn!(target: "hwt::config", error = %error, "stored config is malformed; using defaults");
                return None;
            },
        };

        let migrated = stored.version != CONFIG_VERSION;
        let stored = if migrated { migrate_config(stored) } else { stored };

        match ConfigOverrides::from_json_object(stored.config) {
            Ok(overrides) => {
                if migrated {
                    self.save(&overrides);
                }
                Some(overrides)
            },
            Err(error) => {
                warn!(
                    target: "hwt::config",
                    error = %error,
                    "stored config has an unknown or malformed section; using defaults"
                );
                None
            },
        }
    }

    fn save(&self, overrides: &ConfigOverrides) {
        let document = PersistedConfig {
            version: CONFIG_VERSION,
            config: overrides,
        };
        let encoded = match serde_json::to_string(&document) {
            Ok(encoded) => encoded,
            Err(error) => {
                warn!(target: "hwt::config", error = %error, "failed to encode config");
                return;
            },
        };
        if let Err(error) = self.storage.set_item(STORAGE_KEY, &encoded) {
            warn!(target: "hwt::config", error = %error, "failed to save config");
        }
    }

    /// Clone of the resolved config.
    #[must_use]
    pub fn get_all(&self) -> UserConfig {
        self.config.clone()
    }

    /// Clone of one resolved section.
    #[must_use]
    pub fn get_section(&self, section: ConfigSection) -> SectionValue {
        self.config.section(section)
    }

    /// Resolved value at `key`.
    #[must_use]
    pub fn get(&self, key: impl Into<ConfigKey>) -> ConfigValue {
        self.config.get(key.into())
    }

    /// Resolved feature flag.
    #[must_use]
    pub const fn feature(&self, feature: Feature) -> bool {
        self.config.features.get(feature)
    }

    /// Resolved threshold.
    #[must_use]
    pub const fn threshold(&self, threshold: Threshold) -> i64 {
        self.config.thresholds.get(threshold)
    }

    /// Resolved display string.
    #[must_use]
    pub fn display(&self, key: DisplayKey) -> &str {
        self.config.display.get(key)
    }

    /// Resolved site settings.
    #[must_use]
    pub const fn site(&self, site: Site) -> &SiteConfig {
        self.config.sites.get(site)
    }

    /// Assign `value` at `key`, persist the overrides, and notify.
    ///
    /// Assigning the current value is a no-op. Fails only when the value
    /// kind does not match the key.
    pub fn set(&mut self, key: impl Into<ConfigKey>, value: impl Into<ConfigValue>) -> Result<(), ConfigError> {
        let key = key.into();
        let value = value.into();
        let old = self.config.get(key);
        if old == value {
            return Ok(());
        }

        self.config.set(key, value.clone())?;
        self.overrides.insert(key, value.clone());
        self.save(&self.overrides);
        self.notify(key, &value, &old);
        Ok(())
    }

    /// Set a feature flag.
    pub fn set_feature(&mut self, feature: Feature, enabled: bool) {
        self.set_infallible(feature.into(), ConfigValue::Bool(enabled));
    }

    /// Set a threshold.
    pub fn set_threshold(&mut self, threshold: Threshold, value: i64) {
        self.set_infallible(threshold.into(), ConfigValue::Number(value));
    }

    /// Set a display string.
    pub fn set_display(&mut self, key: DisplayKey, value: impl Into<String>) {
        self.set_infallible(key.into(), ConfigValue::Text(value.into()));
    }

    /// Replace a site's settings.
    pub fn set_site(&mut self, site: Site, settings: SiteConfig) {
        self.set_infallible(site.into(), ConfigValue::Site(settings));
    }

    fn set_infallible(&mut self, key: ConfigKey, value: ConfigValue) {
        if let Err(error) = self.set(key, value) {
            error!(target: "hwt::config", error = %error, "typed setter produced a mismatched value");
        }
    }

    /// Drop the override at `key` and restore the default.
    ///
    /// Persists when an override was removed, even one equal to the
    /// default; notifies only when the resolved value changed.
    pub fn reset(&mut self, key: impl Into<ConfigKey>) {
        let key = key.into();
        let old = self.config.get(key);
        let default = self.defaults.get(key);

        if self.overrides.remove(key) {
            self.save(&self.overrides);
        }
        if old == default {
            return;
        }
        if let Err(error) = self.config.set(key, default.clone()) {
            error!(target: "hwt::config", error = %error, "default has the wrong kind");
            return;
        }
        self.notify(key, &default, &old);
    }

    /// Drop every override and notify all listeners.
    ///
    /// Leaf listeners fire only when their value changed. Every section
    /// listener fires once, changed or not.
    pub fn reset_all(&mut self) {
        let previous = std::mem::replace(&mut self.config, self.defaults.clone());
        self.overrides = ConfigOverrides::default();
        self.save(&self.overrides);
        self.notify_all(&previous);
    }

    /// Listen for changes to one leaf. The callback receives
    /// `(new, old)`.
    pub fn subscribe<F>(&self, key: impl Into<ConfigKey>, callback: F) -> Subscription
    where
        F: Fn(&ConfigValue, &ConfigValue) + 'static,
    {
        self.listeners.subscribe(key.into(), callback)
    }

    /// Listen for changes anywhere in `section`. The callback receives the
    /// current section snapshot twice.
    pub fn subscribe_section<F>(&self, section: ConfigSection, callback: F) -> Subscription
    where
        F: Fn(&SectionValue, &SectionValue) + 'static,
    {
        self.listeners.subscribe_section(section, callback)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Pretty-printed sparse overrides.
    #[must_use]
    pub fn export(&self) -> String {
        serde_json::to_string_pretty(&self.overrides).unwrap_or_else(|_| "{}".to_owned())
    }

    /// Replace all overrides with `json`. Returns false (and changes
    /// nothing) when the payload is rejected.
    pub fn import(&mut self, json: &str) -> bool {
        match self.import_detailed(json) {
            Ok(()) => true,
            Err(error) => {
                error!(target: "hwt::config", error = %error, "failed to import config");
                false
            },
        }
    }

    /// Like [`import`](Self::import), returning the rejection reason.
    pub fn import_detailed(&mut self, json: &str) -> Result<(), ImportError> {
        let parsed: Value =
            serde_json::from_str(json).map_err(|error| ImportError::InvalidJson(error.to_string()))?;
        let Value::Object(object) = parsed else {
            return Err(ImportError::NotAnObject);
        };
        let overrides = ConfigOverrides::from_json_object(object)?;

        let previous = std::mem::replace(&mut self.config, merge(&self.defaults, &overrides));
        self.overrides = overrides;
        self.save(&self.overrides);
        debug!(target: "hwt::config", sections = ?self.overrides.sections(), "imported config");
        self.notify_all(&previous);
        Ok(())
    }

    /// Whether `feature` is on, optionally for one site.
    ///
    /// A disabled site turns everything off. Otherwise a per-site feature
    /// value wins over the global flag.
    #[must_use]
    pub fn is_feature_enabled(&self, feature: Feature, site: Option<Site>) -> bool {
        let global = self.config.features.get(feature);
        let Some(site) = site else {
            return global;
        };
        let settings = self.config.sites.get(site);
        if !settings.enabled {
            return false;
        }
        settings.features.get(&feature).copied().unwrap_or(global)
    }

    /// Resolved threshold.
    #[must_use]
    pub const fn get_threshold(&self, threshold: Threshold) -> i64 {
        self.threshold(threshold)
    }

    /// Resolved display string, owned.
    #[must_use]
    pub fn get_display(&self, key: DisplayKey) -> String {
        self.display(key).to_owned()
    }

    fn notify(&self, key: ConfigKey, new: &ConfigValue, old: &ConfigValue) {
        for callback in self.listeners.leaf_listeners(key) {
            invoke_leaf(&callback, key, new, old);
        }

        let section = key.section();
        let callbacks = self.listeners.section_listeners(section);
        if callbacks.is_empty() {
            return;
        }
        let snapshot = self.config.section(section);
        for callback in callbacks {
            invoke_section(&callback, section, &snapshot);
        }
    }

    fn notify_all(&self, previous: &UserConfig) {
        for (key, callback) in self.listeners.all_leaf_listeners() {
            let old = previous.get(key);
            let new = self.config.get(key);
            if old != new {
                invoke_leaf(&callback, key, &new, &old);
            }
        }

        for section in self.listeners.subscribed_sections() {
            let snapshot = self.config.section(section);
            for callback in self.listeners.section_listeners(section) {
                invoke_section(&callback, section, &snapshot);
            }
        }
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ConfigStore")
            .field("config", &self.config)
            .field("overrides", &self.overrides)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
