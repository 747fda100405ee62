//! Closed set of state cell names and their storage keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix shared by every state cell key.
pub const STATE_PREFIX: &str = "hwt:state:";

/// Name of a persisted state cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StateKey {
    /// Collapsed comment thread ids.
    Collapse,
    /// Visited story ids.
    Visited,
    /// Bookmarked comment ids.
    Bookmarks,
    /// Last visit timestamp per story.
    LastVisit,
    /// New-comment markers per story.
    NewComments,
}

impl StateKey {
    /// Every state key, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Collapse,
        Self::Visited,
        Self::Bookmarks,
        Self::LastVisit,
        Self::NewComments,
    ];

    /// The cell name as it appears in storage keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collapse => "collapse",
            Self::Visited => "visited",
            Self::Bookmarks => "bookmarks",
            Self::LastVisit => "lastVisit",
            Self::NewComments => "newComments",
        }
    }

    /// Full storage key, e.g. `hwt:state:collapse`.
    #[must_use]
    pub fn storage_key(self) -> String {
        format!("{STATE_PREFIX}{}", self.as_str())
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned when a state key name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStateKey(pub String);

impl fmt::Display for UnknownStateKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "unknown state key: {}", self.0)
    }
}

impl std::error::Error for UnknownStateKey {}

impl FromStr for StateKey {
    type Err = UnknownStateKey;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let name = trimmed.strip_prefix(STATE_PREFIX).unwrap_or(trimmed);
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == name)
            .ok_or_else(|| UnknownStateKey(input.to_owned()))
    }
}
