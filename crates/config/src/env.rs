//! Runtime environment for hosts that embed the store.
//!
//! Parsing is strict: a variable that is present must carry a usable value,
//! otherwise parsing fails instead of silently using a default.

use hwt_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Env var: path of the JSON storage file.
pub const ENV_STORAGE_PATH: &str = "HWT_STORAGE_PATH";
/// Env var: tracing filter directive.
pub const ENV_LOG: &str = "HWT_LOG";
/// Env var: reject every storage write (`true|false|1|0`).
pub const ENV_STORAGE_READONLY: &str = "HWT_STORAGE_READONLY";

const ENV_VARS: [&str; 3] = [ENV_STORAGE_PATH, ENV_LOG, ENV_STORAGE_READONLY];

/// Values read from the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeEnv {
    /// Storage file override.
    pub storage_path: Option<PathBuf>,
    /// Log filter override.
    pub log_filter: Option<String>,
    /// Emulate a disabled storage medium.
    pub storage_read_only: bool,
}

impl RuntimeEnv {
    /// Parse from a key/value map (useful for tests).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            storage_path: parse_optional_trimmed(map, ENV_STORAGE_PATH)?.map(PathBuf::from),
            log_filter: parse_optional_trimmed(map, ENV_LOG)?,
            storage_read_only: parse_optional_bool(map, ENV_STORAGE_READONLY)?.unwrap_or(false),
        })
    }

    /// Parse from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for name in ENV_VARS {
            if let Ok(value) = std::env::var(name) {
                map.insert(name.to_owned(), value);
            }
        }
        Self::from_map(&map)
    }
}

/// Env parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    #[error("{var} must be non-empty")]
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Boolean env var had an invalid value.
    #[error("{var} must be a boolean")]
    InvalidBool {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidBool { .. } => ErrorCode::new("config", "invalid_env_bool"),
        }
    }
}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidBool { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", value),
        }
    }
}

fn parse_optional_trimmed(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<String>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    Ok(Some(trimmed.to_owned()))
}

fn parse_optional_bool(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<bool>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(Some(true)),
        "false" | "0" => Ok(Some(false)),
        _ => Err(EnvParseError::InvalidBool {
            var,
            value: raw.clone(),
        }),
    }
}
