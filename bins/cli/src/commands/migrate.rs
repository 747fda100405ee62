//! `hwt migrate` handler.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::OutputMode;
use hwt_facade::{AppContext, LEGACY_COLLAPSE_KEY, SharedStorage, StateKey, StoragePort};

/// Run the init migrations and report what the legacy bridge did.
pub fn run_migrate(storage: SharedStorage, mode: OutputMode) -> Result<CliOutput, CliError> {
    let had_legacy = storage
        .get_item(LEGACY_COLLAPSE_KEY)?
        .is_some_and(|raw| !raw.is_empty());

    let context = AppContext::new(storage);
    let legacy_remaining = context.storage().get_item(LEGACY_COLLAPSE_KEY)?.is_some();
    let collapsed = context.set_state::<String>(StateKey::Collapse).len();

    let stdout = if mode.is_json() {
        let mut output = serde_json::to_string_pretty(&serde_json::json!({
            "status": "ok",
            "legacyFound": had_legacy,
            "legacyRemaining": legacy_remaining,
            "collapsed": collapsed,
        }))?;
        output.push('\n');
        output
    } else {
        format!(
            "status: ok\nlegacy found: {had_legacy}\nlegacy remaining: {legacy_remaining}\ncollapsed: {collapsed}\n"
        )
    };
    Ok(CliOutput::ok(stdout))
}
