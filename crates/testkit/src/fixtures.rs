//! Stored-document fixtures shared by config and state tests.

use serde_json::{Value, json};

/// Storage key of the preference blob.
pub const CONFIG_KEY: &str = "hwt:config";

/// Storage key written by the pre-versioned collapse feature.
pub const LEGACY_COLLAPSE_KEY: &str = "hwc-collapsed";

/// A current-version blob with a handful of overrides.
pub fn sparse_config() -> Value {
    json!({
        "version": 1,
        "config": {
            "features": { "keyboardNav": true, "collapse": false },
            "thresholds": { "minScore": 10 },
            "sites": { "hn": { "enabled": false } }
        }
    })
}

/// A current-version blob carrying a key this build does not know and
/// leaves of the wrong kind next to valid overrides.
pub fn stale_config() -> Value {
    json!({
        "version": 1,
        "config": {
            "features": { "keyboardNav": true, "comfortMode": true, "collapse": "yes" },
            "thresholds": { "minScore": 10, "gutterClickPx": 2.5 }
        }
    })
}

/// A blob written by some newer release.
pub fn future_config() -> Value {
    json!({
        "version": 99,
        "config": { "features": { "keyboardNav": true } }
    })
}

/// Legacy collapse payload mixing valid and invalid comment ids.
pub fn legacy_collapse_ids() -> Value {
    json!(["123", "456", "abc", "", "12x", 789])
}

/// An export document as produced by a current store.
pub fn export_document() -> Value {
    json!({
        "features": { "readingProgress": true },
        "thresholds": { "highScoreThreshold": 200 },
        "display": { "newCommentColor": "#ccffcc" },
        "sites": { "hackerweb": { "features": { "collapse": false } } }
    })
}
