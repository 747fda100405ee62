//! # hwt-config
//!
//! Preference schema, forward migrations, and the observable config store.
//! The store persists a sparse diff from the defaults under one storage key
//! and notifies subscribers synchronously on every effective change.

/// Runtime environment parsing.
pub mod env;
/// Config-domain errors.
pub mod errors;
mod listeners;
/// Labels, groups, and ranges for settings UIs.
pub mod metadata;
/// Versioned blob migrations and the legacy collapse bridge.
pub mod migrations;
/// Sparse overrides and merging.
pub mod overrides;
/// Schema types and defaults.
pub mod schema;
/// The config store.
pub mod store;
/// Leaf and section addressing.
pub mod value;

pub use env::{EnvParseError, RuntimeEnv};
pub use errors::{ConfigError, ImportError};
pub use listeners::Subscription;
pub use metadata::{
    DisplayKind, DisplayMeta, FeatureGroup, FeatureMeta, ThresholdMeta, ThresholdRange,
};
pub use migrations::{
    LEGACY_COLLAPSE_KEY, StoredConfig, migrate_config, migrate_legacy_collapse_state,
    run_migrations,
};
pub use overrides::{ConfigOverrides, SiteOverride, merge};
pub use schema::{
    CONFIG_VERSION, ConfigSection, DisplayKey, DisplaySettings, Feature, FeatureFlags, Site,
    SiteConfig, SitesConfig, Threshold, Thresholds, UserConfig, default_config,
};
pub use store::{ConfigStore, STORAGE_KEY};
pub use value::{ConfigKey, ConfigValue, SectionValue};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
