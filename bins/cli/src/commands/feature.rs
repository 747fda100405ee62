//! `hwt feature` handler.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::OutputMode;
use hwt_facade::{AppContext, Feature, Site};

/// Print whether `feature` is effectively enabled, optionally on `site`.
pub fn run_feature(
    context: &mut AppContext,
    mode: OutputMode,
    feature: &str,
    site: Option<&str>,
) -> Result<CliOutput, CliError> {
    let feature: Feature = feature.parse()?;
    let site: Option<Site> = site.map(str::parse).transpose()?;
    let enabled = context.is_feature_enabled(feature, site);

    let stdout = if mode.is_json() {
        let mut output = serde_json::to_string_pretty(&serde_json::json!({
            "feature": feature,
            "site": site,
            "enabled": enabled,
        }))?;
        output.push('\n');
        output
    } else {
        format!("{enabled}\n")
    };
    Ok(CliOutput::ok(stdout))
}
