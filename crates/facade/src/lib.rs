//! # hwt-facade
//!
//! Entry point for consumers (feature code and the CLI). Wires one storage
//! medium to the migrations, the config store, and the state cells, and
//! re-exports the public API so callers depend on a single crate.

pub mod context;

pub use context::{AppContext, open_storage};

pub use hwt_adapters::{JsonFileStorage, MemoryStorage};
pub use hwt_config::{
    CONFIG_VERSION, ConfigError, ConfigKey, ConfigSection, ConfigStore, ConfigValue, DisplayKey,
    EnvParseError, Feature, FeatureGroup, ImportError, LEGACY_COLLAPSE_KEY, RuntimeEnv,
    STORAGE_KEY, SectionValue, Site, SiteConfig, Subscription, Threshold, UserConfig,
    default_config, run_migrations,
};
pub use hwt_ports::{SharedStorage, StoragePort};
pub use hwt_shared::{ErrorCode, ErrorEnvelope, ErrorKind, Result};
pub use hwt_state::{CommentId, MapState, SetState, StateKey, TypedState, UnknownStateKey};

/// Returns the facade crate version.
#[must_use]
pub const fn facade_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
