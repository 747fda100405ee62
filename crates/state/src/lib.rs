//! # hwt-state
//!
//! Persisted runtime state kept outside the preference blob: collapsed
//! thread ids, visited items, bookmarks, last-visit timestamps.
//!
//! Each cell owns exactly one storage key (`hwt:state:<name>`), caches the
//! resolved value in memory, and writes through on every mutation. Cells are
//! not versioned and are not part of config export/import.
//!
//! Consistency is per process only: two cells (or two processes) over the
//! same key do not invalidate each other's caches. Last writer wins.

pub mod comment_id;
pub mod key;
pub mod map;
pub mod set;
pub mod typed;
pub mod validators;

pub use comment_id::CommentId;
pub use key::{STATE_PREFIX, StateKey, UnknownStateKey};
pub use map::MapState;
pub use set::SetState;
pub use typed::TypedState;
pub use validators::Validator;

/// Returns the state crate version.
#[must_use]
pub const fn state_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
