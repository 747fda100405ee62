//! CLI command handlers.

pub mod config;
pub mod feature;
pub mod migrate;
pub mod state;

pub use config::{
    run_config_export, run_config_get, run_config_import, run_config_reset, run_config_reset_all,
    run_config_set, run_config_show,
};
pub use feature::run_feature;
pub use migrate::run_migrate;
pub use state::{run_state_list, run_state_show};
