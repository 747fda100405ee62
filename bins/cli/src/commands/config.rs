//! `hwt config ...` handlers.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::{OutputMode, render_ack, render_value};
use hwt_facade::{AppContext, ConfigKey, ConfigValue};
use serde_json::Value;
use std::io::{self, Read};
use std::path::Path;

/// Print the resolved config.
pub fn run_config_show(context: &mut AppContext) -> Result<CliOutput, CliError> {
    let mut stdout = serde_json::to_string_pretty(&context.store().get_all())?;
    stdout.push('\n');
    Ok(CliOutput::ok(stdout))
}

/// Print one resolved value.
pub fn run_config_get(
    context: &mut AppContext,
    mode: OutputMode,
    section: &str,
    key: &str,
) -> Result<CliOutput, CliError> {
    let key = ConfigKey::parse(section, key)?;
    let value = context.store().get(key);
    Ok(CliOutput::ok(render_value(mode, &value.to_json())?))
}

/// Assign one value given as JSON text.
pub fn run_config_set(
    context: &mut AppContext,
    mode: OutputMode,
    section: &str,
    key: &str,
    raw_value: &str,
) -> Result<CliOutput, CliError> {
    let key = ConfigKey::parse(section, key)?;
    let json: Value = serde_json::from_str(raw_value)
        .map_err(|error| CliError::InvalidInput(format!("value is not JSON: {error}")))?;
    let value = ConfigValue::from_json(key, json)?;
    let rendered = value.to_json();
    context.store().set(key, value)?;
    Ok(CliOutput::ok(render_ack(mode, &format!("{key} = {rendered}"))?))
}

/// Drop one override.
pub fn run_config_reset(
    context: &mut AppContext,
    mode: OutputMode,
    section: &str,
    key: &str,
) -> Result<CliOutput, CliError> {
    let key = ConfigKey::parse(section, key)?;
    context.store().reset(key);
    let restored = context.store().get(key).to_json();
    Ok(CliOutput::ok(render_ack(mode, &format!("{key} = {restored}"))?))
}

/// Drop every override.
pub fn run_config_reset_all(context: &mut AppContext, mode: OutputMode) -> Result<CliOutput, CliError> {
    context.store().reset_all();
    Ok(CliOutput::ok(render_ack(mode, "all overrides cleared")?))
}

/// Print the sparse overrides.
pub fn run_config_export(context: &mut AppContext) -> CliOutput {
    let mut stdout = context.store().export();
    stdout.push('\n');
    CliOutput::ok(stdout)
}

/// Replace the overrides with a document read from `source` (`-` is stdin).
pub fn run_config_import(
    context: &mut AppContext,
    mode: OutputMode,
    source: &Path,
) -> Result<CliOutput, CliError> {
    let document = if source == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(source)?
    };
    context.store().import_detailed(&document)?;
    Ok(CliOutput::ok(render_ack(mode, "config imported")?))
}
