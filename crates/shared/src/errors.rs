//! Error envelope returned across the storage boundary.
//!
//! Storage faults are the only errors that cross crate seams. Everything the
//! store and state cells do with them is absorb-and-log, so the envelope
//! carries enough to write one useful log line: where the fault came from,
//! whether the data on the medium may still be intact, a stable code, and
//! free-form metadata (storage key, file path).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, io};

/// Metadata attached to errors for diagnostics.
pub type ErrorMetadata = BTreeMap<String, String>;

/// Where a failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Environmental failures callers are expected to absorb (bad input,
    /// full quota, disabled storage).
    Expected,
    /// Faults that indicate a bug or a damaged process (poisoned locks,
    /// encoding failures).
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Expected => "expected",
            Self::Unexpected => "unexpected",
        })
    }
}

/// Whether the same operation might succeed later against the same medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// The medium may recover (interrupted I/O, a busy file).
    Transient,
    /// Repeating the operation will fail the same way.
    Permanent,
}

impl ErrorClass {
    /// Returns true when repeating the operation could succeed.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Transient)
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Transient => "transient",
            Self::Permanent => "permanent",
        })
    }
}

/// Namespaced error code, rendered as `namespace:code`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode {
    namespace: String,
    code: String,
}

impl ErrorCode {
    /// Create a new error code with a namespace and code.
    pub fn new(namespace: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            code: code.into(),
        }
    }

    /// Input rejected before touching the medium.
    pub fn invalid_input() -> Self {
        Self::new("hwt", "invalid_input")
    }

    /// A path or document the medium expected is missing.
    pub fn not_found() -> Self {
        Self::new("storage", "not_found")
    }

    /// Any other I/O failure from the medium.
    pub fn io() -> Self {
        Self::new("storage", "io")
    }

    /// Internal failure (poisoned lock, encoder bug).
    pub fn internal() -> Self {
        Self::new("hwt", "internal")
    }

    /// The storage medium refused a write because it is full.
    pub fn quota_exceeded() -> Self {
        Self::new("storage", "quota_exceeded")
    }

    /// The storage medium is disabled, denied, or read-only.
    pub fn storage_unavailable() -> Self {
        Self::new("storage", "unavailable")
    }

    /// Returns the namespace portion.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the code identifier.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.namespace, self.code)
    }
}

/// Structured error shared by every crate in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Where the failure originated.
    pub kind: ErrorKind,
    /// Whether the medium may recover.
    pub class: ErrorClass,
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Additional diagnostic metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: ErrorMetadata,
}

impl ErrorEnvelope {
    fn build(kind: ErrorKind, class: ErrorClass, code: ErrorCode, message: String) -> Self {
        Self {
            kind,
            class,
            code,
            message,
            metadata: ErrorMetadata::new(),
        }
    }

    /// An expected, permanent failure.
    pub fn expected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::build(ErrorKind::Expected, ErrorClass::Permanent, code, message.into())
    }

    /// An unexpected failure with an explicit class.
    pub fn unexpected(code: ErrorCode, message: impl Into<String>, class: ErrorClass) -> Self {
        Self::build(ErrorKind::Unexpected, class, code, message.into())
    }

    /// An unexpected, permanent `hwt:internal` failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::unexpected(ErrorCode::internal(), message, ErrorClass::Permanent)
    }

    /// Storage refused a write because it is full.
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::expected(ErrorCode::quota_exceeded(), message)
    }

    /// Storage is disabled, denied, or read-only.
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::expected(ErrorCode::storage_unavailable(), message)
    }

    /// Attach a single metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} ({}, {}): {}", self.code, self.kind, self.class, self.message)
    }
}

impl std::error::Error for ErrorEnvelope {}

/// Disk errors are mapped onto the browser-storage vocabulary: a full disk
/// is a quota failure, a denied or read-only file is unavailable storage.
impl From<io::Error> for ErrorEnvelope {
    fn from(error: io::Error) -> Self {
        let class = match error.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted => {
                ErrorClass::Transient
            },
            _ => ErrorClass::Permanent,
        };
        match error.kind() {
            io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded | io::ErrorKind::FileTooLarge => {
                Self::quota_exceeded(error.to_string())
            },
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                Self::storage_unavailable(error.to_string())
            },
            io::ErrorKind::NotFound => Self::unexpected(ErrorCode::not_found(), error.to_string(), class),
            _ => Self::unexpected(ErrorCode::io(), error.to_string(), class),
        }
    }
}
