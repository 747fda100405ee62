//! Tagged validation results for runtime shape checks.
//!
//! Validators return `Valid(value)` or `Invalid(reason)` rather than a bare
//! boolean so callers that fall back to defaults can log why.

use std::fmt;

/// Outcome of validating untrusted data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T> {
    /// The input had the expected shape.
    Valid(T),
    /// The input was rejected; the reason is human-readable.
    Invalid(String),
}

impl<T> Validation<T> {
    /// Build an invalid outcome.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }

    /// Returns true for `Valid`.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Map the valid value, preserving the rejection reason.
    pub fn map<U, F>(self, op: F) -> Validation<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Valid(value) => Validation::Valid(op(value)),
            Self::Invalid(reason) => Validation::Invalid(reason),
        }
    }

    /// Chain another validation step.
    pub fn and_then<U, F>(self, op: F) -> Validation<U>
    where
        F: FnOnce(T) -> Validation<U>,
    {
        match self {
            Self::Valid(value) => op(value),
            Self::Invalid(reason) => Validation::Invalid(reason),
        }
    }

    /// Convert into a `Result` with the reason as the error.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(reason) => Err(reason),
        }
    }

    /// Returns the valid value, discarding the reason.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid(_) => None,
        }
    }
}

impl<T, E: fmt::Display> From<Result<T, E>> for Validation<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Valid(value),
            Err(error) => Self::Invalid(error.to_string()),
        }
    }
}
