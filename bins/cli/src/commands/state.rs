//! `hwt state ...` handlers.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::{OutputMode, render_value};
use hwt_facade::{AppContext, StateKey, StoragePort, UnknownStateKey};
use serde_json::Value;

/// Print the raw persisted value of one state cell (`null` when absent).
pub fn run_state_show(context: &AppContext, mode: OutputMode, key: &str) -> Result<CliOutput, CliError> {
    let key: StateKey = key
        .parse()
        .map_err(|error: UnknownStateKey| CliError::InvalidInput(error.to_string()))?;
    let raw = context.storage().get_item(&key.storage_key())?;
    let value = match raw {
        Some(raw) if !raw.is_empty() => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(_) => Value::String(raw),
        },
        _ => Value::Null,
    };
    Ok(CliOutput::ok(render_value(mode, &value)?))
}

/// List every state cell with the size of its persisted payload.
pub fn run_state_list(context: &AppContext, mode: OutputMode) -> Result<CliOutput, CliError> {
    let mut cells = serde_json::Map::new();
    for key in StateKey::ALL {
        let bytes = context
            .storage()
            .get_item(&key.storage_key())?
            .map_or(0, |raw| raw.len());
        cells.insert(key.as_str().to_owned(), Value::from(bytes));
    }

    let stdout = if mode.is_json() {
        let mut output = serde_json::to_string_pretty(&Value::Object(cells))?;
        output.push('\n');
        output
    } else {
        cells
            .iter()
            .map(|(name, bytes)| format!("{name}: {bytes} bytes\n"))
            .collect()
    };
    Ok(CliOutput::ok(stdout))
}
