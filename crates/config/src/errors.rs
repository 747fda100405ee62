//! Config-domain errors and their envelope mapping.

use crate::schema::ConfigSection;
use hwt_shared::{ErrorCode, ErrorEnvelope};
use thiserror::Error;

/// Failure to address or assign a config value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The section name is not part of the schema.
    #[error("unknown config section: {0}")]
    UnknownSection(String),
    /// The key is not part of the named section.
    #[error("unknown key {key:?} in section {section}")]
    UnknownKey {
        /// Section that was searched.
        section: ConfigSection,
        /// Rejected key.
        key: String,
    },
    /// The value has the wrong kind for the key.
    #[error("{section}.{key} expects {expected}, got {found}")]
    TypeMismatch {
        /// Section of the key.
        section: ConfigSection,
        /// Key being assigned.
        key: &'static str,
        /// Expected kind.
        expected: &'static str,
        /// Supplied kind.
        found: &'static str,
    },
    /// The value could not be decoded for the key.
    #[error("invalid value for {section}.{key}: {reason}")]
    InvalidValue {
        /// Section of the key.
        section: ConfigSection,
        /// Key being assigned.
        key: &'static str,
        /// Decoder message.
        reason: String,
    },
}

impl ConfigError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnknownSection(_) => ErrorCode::new("config", "unknown_section"),
            Self::UnknownKey { .. } => ErrorCode::new("config", "unknown_key"),
            Self::TypeMismatch { .. } => ErrorCode::new("config", "type_mismatch"),
            Self::InvalidValue { .. } => ErrorCode::new("config", "invalid_value"),
        }
    }
}

impl From<ConfigError> for ErrorEnvelope {
    fn from(error: ConfigError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            ConfigError::UnknownSection(section) => envelope.with_metadata("section", section),
            ConfigError::UnknownKey { section, key } => envelope
                .with_metadata("section", section.as_str())
                .with_metadata("key", key),
            ConfigError::TypeMismatch { section, key, .. }
            | ConfigError::InvalidValue { section, key, .. } => envelope
                .with_metadata("section", section.as_str())
                .with_metadata("key", key),
        }
    }
}

/// Reason an import payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// The payload is not JSON.
    #[error("import is not valid JSON: {0}")]
    InvalidJson(String),
    /// The payload is JSON but not an object.
    #[error("import must be a JSON object")]
    NotAnObject,
    /// A top-level key is not a config section.
    #[error("unknown config section: {0}")]
    UnknownSection(String),
    /// A section value is not an object.
    #[error("section {0} must be a JSON object")]
    SectionNotObject(String),
}

impl ImportError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidJson(_) => ErrorCode::new("config", "import_invalid_json"),
            Self::NotAnObject | Self::UnknownSection(_) | Self::SectionNotObject(_) => {
                ErrorCode::new("config", "import_invalid_structure")
            },
        }
    }
}

impl From<ImportError> for ErrorEnvelope {
    fn from(error: ImportError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            ImportError::UnknownSection(section) | ImportError::SectionNotObject(section) => {
                envelope.with_metadata("section", section)
            },
            ImportError::InvalidJson(_) | ImportError::NotAnObject => envelope,
        }
    }
}
