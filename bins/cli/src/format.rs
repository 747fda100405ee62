//! Output format helpers for CLI commands.

use clap::{Args, ValueEnum};
use serde_json::Value;

/// Output format choices for CLI responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-friendly text output.
    #[default]
    Text,
    /// Machine-friendly JSON output.
    Json,
}

/// Output-related CLI flags.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Output format for command responses.
    #[arg(long, global = true, value_enum, default_value_t)]
    pub output: OutputFormat,
}

/// Output mode derived from CLI flags.
#[derive(Debug, Clone, Copy)]
pub struct OutputMode {
    pub format: OutputFormat,
}

impl OutputMode {
    /// Build output mode from CLI flags.
    #[must_use]
    pub const fn from_args(args: &OutputArgs) -> Self {
        Self {
            format: args.output,
        }
    }

    /// Returns true when JSON output is requested.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }
}

/// Render a JSON value as one line in text mode, pretty in JSON mode.
pub fn render_value(mode: OutputMode, value: &Value) -> Result<String, serde_json::Error> {
    let mut output = if mode.is_json() {
        serde_json::to_string_pretty(value)?
    } else {
        match value {
            Value::String(text) => text.clone(),
            other => serde_json::to_string(other)?,
        }
    };
    output.push('\n');
    Ok(output)
}

/// Render a `status: ok` acknowledgement with one detail line.
pub fn render_ack(mode: OutputMode, detail: &str) -> Result<String, serde_json::Error> {
    if mode.is_json() {
        let mut output = serde_json::to_string_pretty(&serde_json::json!({
            "status": "ok",
            "detail": detail,
        }))?;
        output.push('\n');
        Ok(output)
    } else {
        Ok(format!("status: ok\n{detail}\n"))
    }
}
