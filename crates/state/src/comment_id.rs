//! Validated comment identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A comment id: a non-empty string of ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommentId(String);

impl CommentId {
    /// Returns true when `input` is a well-formed comment id.
    #[must_use]
    pub fn is_valid(input: &str) -> bool {
        !input.is_empty() && input.bytes().all(|byte| byte.is_ascii_digit())
    }

    /// Validate `input` as a comment id.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        Self::is_valid(input).then(|| Self(input.to_owned()))
    }

    /// Borrow the id as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommentId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if Self::is_valid(&value) {
            Ok(Self(value))
        } else {
            Err(format!("invalid comment id: {value:?}"))
        }
    }
}

impl From<CommentId> for String {
    fn from(id: CommentId) -> Self {
        id.0
    }
}

impl AsRef<str> for CommentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}
