//! # hwt-testkit
//!
//! Test helpers: fault-injecting storage, log capture, and config fixtures.
//! This crate depends on `ports` and `shared`.

pub mod errors;
pub mod faulty;
pub mod fixtures;
pub mod logs;

pub use faulty::FaultyStorage;
pub use logs::capture_logs;

/// Returns the testkit crate version.
#[must_use]
pub const fn testkit_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
