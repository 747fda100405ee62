//! Tracing subscriber initialization for the `hwt` binary.
//!
//! Logs go to stderr so stdout stays parseable. The filter comes from
//! `HWT_LOG`, then `RUST_LOG`, then defaults to `warn`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const DEFAULT_DIRECTIVE: &str = "warn";

/// Install the global subscriber. A second call is ignored.
pub fn init_subscriber(log_filter: Option<&str>) {
    let stderr_is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(stderr_is_tty)
        .with_target(true)
        .without_time()
        .compact();

    let _ = tracing_subscriber::registry()
        .with(build_env_filter(log_filter))
        .with(fmt_layer)
        .try_init();
}

fn build_env_filter(log_filter: Option<&str>) -> EnvFilter {
    if let Some(directives) = log_filter
        && let Ok(filter) = EnvFilter::try_new(directives)
    {
        return filter;
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(DEFAULT_DIRECTIVE)
}
