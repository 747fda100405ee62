//! Preference schema: closed key sets, resolved config types, and defaults.
//!
//! The resolved [`UserConfig`] always carries every key. Sparse data lives
//! only in [`crate::overrides::ConfigOverrides`].

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Current schema version of the persisted preference blob.
pub const CONFIG_VERSION: u32 = 1;

// ============================================================================
// Key sets
// ============================================================================

/// Top-level config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigSection {
    /// Feature toggles.
    Features,
    /// Numeric tunables.
    Thresholds,
    /// Display strings.
    Display,
    /// Per-site overrides.
    Sites,
}

impl ConfigSection {
    /// Every section, in schema order.
    pub const ALL: [Self; 4] = [Self::Features, Self::Thresholds, Self::Display, Self::Sites];

    /// Section name as persisted.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Features => "features",
            Self::Thresholds => "thresholds",
            Self::Display => "display",
            Self::Sites => "sites",
        }
    }
}

impl fmt::Display for ConfigSection {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ConfigSection {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.as_str() == input)
            .ok_or_else(|| ConfigError::UnknownSection(input.to_owned()))
    }
}

/// Feature flag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    /// Collapsible comment threads.
    Collapse,
    /// Links to the alternate reader.
    HwebLinks,
    /// j/k keyboard navigation.
    KeyboardNav,
    /// Highlight comments added since the last visit.
    NewCommentHighlight,
    /// Badge on the original poster's comments.
    OpBadge,
    /// URL tracks the focused comment.
    DeepLink,
    /// Collapse deep threads automatically.
    CollapseByDepth,
    /// Hide already-visited stories.
    HideReadStories,
    /// Dim low-scoring items.
    ScoreThreshold,
    /// Group stories by time period.
    TimeGrouping,
    /// Inline link previews.
    InlinePreview,
    /// Follow the system color scheme.
    DarkModeSync,
    /// Scroll progress bar.
    ReadingProgress,
    /// Saved comments.
    CommentBookmarks,
}

impl Feature {
    /// Every feature, in schema order.
    pub const ALL: [Self; 14] = [
        Self::Collapse,
        Self::HwebLinks,
        Self::KeyboardNav,
        Self::NewCommentHighlight,
        Self::OpBadge,
        Self::DeepLink,
        Self::CollapseByDepth,
        Self::HideReadStories,
        Self::ScoreThreshold,
        Self::TimeGrouping,
        Self::InlinePreview,
        Self::DarkModeSync,
        Self::ReadingProgress,
        Self::CommentBookmarks,
    ];

    /// Feature name as persisted.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collapse => "collapse",
            Self::HwebLinks => "hwebLinks",
            Self::KeyboardNav => "keyboardNav",
            Self::NewCommentHighlight => "newCommentHighlight",
            Self::OpBadge => "opBadge",
            Self::DeepLink => "deepLink",
            Self::CollapseByDepth => "collapseByDepth",
            Self::HideReadStories => "hideReadStories",
            Self::ScoreThreshold => "scoreThreshold",
            Self::TimeGrouping => "timeGrouping",
            Self::InlinePreview => "inlinePreview",
            Self::DarkModeSync => "darkModeSync",
            Self::ReadingProgress => "readingProgress",
            Self::CommentBookmarks => "commentBookmarks",
        }
    }
}

/// Numeric tunable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Threshold {
    /// Hide stories below this score.
    MinScore,
    /// Hide stories below this comment count.
    MinComments,
    /// Width of the clickable collapse gutter, in pixels.
    GutterClickPx,
    /// Nesting depth at which threads auto-collapse.
    AutoCollapseDepth,
    /// Score at which an item counts as high-scoring.
    HighScoreThreshold,
    /// Score at which an item counts as low-scoring.
    LowScoreThreshold,
}

impl Threshold {
    /// Every threshold, in schema order.
    pub const ALL: [Self; 6] = [
        Self::MinScore,
        Self::MinComments,
        Self::GutterClickPx,
        Self::AutoCollapseDepth,
        Self::HighScoreThreshold,
        Self::LowScoreThreshold,
    ];

    /// Threshold name as persisted.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MinScore => "minScore",
            Self::MinComments => "minComments",
            Self::GutterClickPx => "gutterClickPx",
            Self::AutoCollapseDepth => "autoCollapseDepth",
            Self::HighScoreThreshold => "highScoreThreshold",
            Self::LowScoreThreshold => "lowScoreThreshold",
        }
    }
}

/// Display setting name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayKey {
    /// CSS max-width of the content column.
    MaxContentWidth,
    /// CSS line-height of comment bodies.
    CommentLineHeight,
    /// Background color of new comments.
    NewCommentColor,
}

impl DisplayKey {
    /// Every display key, in schema order.
    pub const ALL: [Self; 3] = [
        Self::MaxContentWidth,
        Self::CommentLineHeight,
        Self::NewCommentColor,
    ];

    /// Display key name as persisted.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MaxContentWidth => "maxContentWidth",
            Self::CommentLineHeight => "commentLineHeight",
            Self::NewCommentColor => "newCommentColor",
        }
    }
}

/// Site identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    /// The alternate reader.
    Hackerweb,
    /// The original news site.
    Hn,
}

impl Site {
    /// Every site.
    pub const ALL: [Self; 2] = [Self::Hackerweb, Self::Hn];

    /// Site name as persisted.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hackerweb => "hackerweb",
            Self::Hn => "hn",
        }
    }
}

fn parse_key<T: Copy>(
    all: &[T],
    name: fn(T) -> &'static str,
    section: ConfigSection,
    input: &str,
) -> Result<T, ConfigError> {
    all.iter()
        .copied()
        .find(|key| name(*key) == input)
        .ok_or_else(|| ConfigError::UnknownKey {
            section,
            key: input.to_owned(),
        })
}

impl FromStr for Feature {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        parse_key(&Self::ALL, Self::as_str, ConfigSection::Features, input)
    }
}

impl FromStr for Threshold {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        parse_key(&Self::ALL, Self::as_str, ConfigSection::Thresholds, input)
    }
}

impl FromStr for DisplayKey {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        parse_key(&Self::ALL, Self::as_str, ConfigSection::Display, input)
    }
}

impl FromStr for Site {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        parse_key(&Self::ALL, Self::as_str, ConfigSection::Sites, input)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl fmt::Display for DisplayKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl fmt::Display for Site {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

// ============================================================================
// Resolved sections
// ============================================================================

/// Resolved feature toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[expect(clippy::struct_excessive_bools, reason = "one flag per feature")]
pub struct FeatureFlags {
    /// See [`Feature::Collapse`].
    pub collapse: bool,
    /// See [`Feature::HwebLinks`].
    pub hweb_links: bool,
    /// See [`Feature::KeyboardNav`].
    pub keyboard_nav: bool,
    /// See [`Feature::NewCommentHighlight`].
    pub new_comment_highlight: bool,
    /// See [`Feature::OpBadge`].
    pub op_badge: bool,
    /// See [`Feature::DeepLink`].
    pub deep_link: bool,
    /// See [`Feature::CollapseByDepth`].
    pub collapse_by_depth: bool,
    /// See [`Feature::HideReadStories`].
    pub hide_read_stories: bool,
    /// See [`Feature::ScoreThreshold`].
    pub score_threshold: bool,
    /// See [`Feature::TimeGrouping`].
    pub time_grouping: bool,
    /// See [`Feature::InlinePreview`].
    pub inline_preview: bool,
    /// See [`Feature::DarkModeSync`].
    pub dark_mode_sync: bool,
    /// See [`Feature::ReadingProgress`].
    pub reading_progress: bool,
    /// See [`Feature::CommentBookmarks`].
    pub comment_bookmarks: bool,
}

impl FeatureFlags {
    /// Current value of `feature`.
    #[must_use]
    pub const fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::Collapse => self.collapse,
            Feature::HwebLinks => self.hweb_links,
            Feature::KeyboardNav => self.keyboard_nav,
            Feature::NewCommentHighlight => self.new_comment_highlight,
            Feature::OpBadge => self.op_badge,
            Feature::DeepLink => self.deep_link,
            Feature::CollapseByDepth => self.collapse_by_depth,
            Feature::HideReadStories => self.hide_read_stories,
            Feature::ScoreThreshold => self.score_threshold,
            Feature::TimeGrouping => self.time_grouping,
            Feature::InlinePreview => self.inline_preview,
            Feature::DarkModeSync => self.dark_mode_sync,
            Feature::ReadingProgress => self.reading_progress,
            Feature::CommentBookmarks => self.comment_bookmarks,
        }
    }

    /// Overwrite `feature`.
    pub const fn set(&mut self, feature: Feature, enabled: bool) {
        let slot = match feature {
            Feature::Collapse => &mut self.collapse,
            Feature::HwebLinks => &mut self.hweb_links,
            Feature::KeyboardNav => &mut self.keyboard_nav,
            Feature::NewCommentHighlight => &mut self.new_comment_highlight,
            Feature::OpBadge => &mut self.op_badge,
            Feature::DeepLink => &mut self.deep_link,
            Feature::CollapseByDepth => &mut self.collapse_by_depth,
            Feature::HideReadStories => &mut self.hide_read_stories,
            Feature::ScoreThreshold => &mut self.score_threshold,
            Feature::TimeGrouping => &mut self.time_grouping,
            Feature::InlinePreview => &mut self.inline_preview,
            Feature::DarkModeSync => &mut self.dark_mode_sync,
            Feature::ReadingProgress => &mut self.reading_progress,
            Feature::CommentBookmarks => &mut self.comment_bookmarks,
        };
        *slot = enabled;
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            collapse: true,
            hweb_links: true,
            op_badge: true,
            deep_link: true,
            keyboard_nav: false,
            new_comment_highlight: false,
            hide_read_stories: false,
            dark_mode_sync: false,
            reading_progress: false,
            comment_bookmarks: false,
            score_threshold: false,
            collapse_by_depth: false,
            time_grouping: false,
            inline_preview: false,
        }
    }
}

/// Resolved numeric tunables.
///
/// Every tunable is a whole number (scores, counts, pixels, depths), so
/// values are held as `i64`. A stored or imported fractional value such as
/// `2.5` is not rounded: that one entry is skipped with a warning and the
/// default stays in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    /// See [`Threshold::MinScore`].
    pub min_score: i64,
    /// See [`Threshold::MinComments`].
    pub min_comments: i64,
    /// See [`Threshold::GutterClickPx`].
    pub gutter_click_px: i64,
    /// See [`Threshold::AutoCollapseDepth`].
    pub auto_collapse_depth: i64,
    /// See [`Threshold::HighScoreThreshold`].
    pub high_score_threshold: i64,
    /// See [`Threshold::LowScoreThreshold`].
    pub low_score_threshold: i64,
}

impl Thresholds {
    /// Current value of `threshold`.
    #[must_use]
    pub const fn get(&self, threshold: Threshold) -> i64 {
        match threshold {
            Threshold::MinScore => self.min_score,
            Threshold::MinComments => self.min_comments,
            Threshold::GutterClickPx => self.gutter_click_px,
            Threshold::AutoCollapseDepth => self.auto_collapse_depth,
            Threshold::HighScoreThreshold => self.high_score_threshold,
            Threshold::LowScoreThreshold => self.low_score_threshold,
        }
    }

    /// Overwrite `threshold`.
    pub const fn set(&mut self, threshold: Threshold, value: i64) {
        let slot = match threshold {
            Threshold::MinScore => &mut self.min_score,
            Threshold::MinComments => &mut self.min_comments,
            Threshold::GutterClickPx => &mut self.gutter_click_px,
            Threshold::AutoCollapseDepth => &mut self.auto_collapse_depth,
            Threshold::HighScoreThreshold => &mut self.high_score_threshold,
            Threshold::LowScoreThreshold => &mut self.low_score_threshold,
        };
        *slot = value;
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_score: 0,
            min_comments: 0,
            gutter_click_px: 15,
            auto_collapse_depth: 5,
            high_score_threshold: 100,
            low_score_threshold: -5,
        }
    }
}

/// Resolved display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    /// See [`DisplayKey::MaxContentWidth`].
    pub max_content_width: String,
    /// See [`DisplayKey::CommentLineHeight`].
    pub comment_line_height: String,
    /// See [`DisplayKey::NewCommentColor`].
    pub new_comment_color: String,
}

impl DisplaySettings {
    /// Current value of `key`.
    #[must_use]
    pub fn get(&self, key: DisplayKey) -> &str {
        match key {
            DisplayKey::MaxContentWidth => &self.max_content_width,
            DisplayKey::CommentLineHeight => &self.comment_line_height,
            DisplayKey::NewCommentColor => &self.new_comment_color,
        }
    }

    /// Overwrite `key`.
    pub fn set(&mut self, key: DisplayKey, value: String) {
        let slot = match key {
            DisplayKey::MaxContentWidth => &mut self.max_content_width,
            DisplayKey::CommentLineHeight => &mut self.comment_line_height,
            DisplayKey::NewCommentColor => &mut self.new_comment_color,
        };
        *slot = value;
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            max_content_width: "900px".to_owned(),
            comment_line_height: "1.5".to_owned(),
            new_comment_color: "#ffffcc".to_owned(),
        }
    }
}

/// Per-site switch and feature overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// When false every feature is off on this site.
    pub enabled: bool,
    /// Feature values that win over the global flags on this site.
    #[serde(default)]
    pub features: BTreeMap<Feature, bool>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            features: BTreeMap::new(),
        }
    }
}

/// Resolved per-site settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitesConfig {
    /// Settings for [`Site::Hackerweb`].
    pub hackerweb: SiteConfig,
    /// Settings for [`Site::Hn`].
    pub hn: SiteConfig,
}

impl SitesConfig {
    /// Settings for `site`.
    #[must_use]
    pub const fn get(&self, site: Site) -> &SiteConfig {
        match site {
            Site::Hackerweb => &self.hackerweb,
            Site::Hn => &self.hn,
        }
    }

    /// Mutable settings for `site`.
    pub const fn get_mut(&mut self, site: Site) -> &mut SiteConfig {
        match site {
            Site::Hackerweb => &mut self.hackerweb,
            Site::Hn => &mut self.hn,
        }
    }
}

/// Fully resolved configuration: defaults with overrides applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Feature toggles.
    pub features: FeatureFlags,
    /// Numeric tunables.
    pub thresholds: Thresholds,
    /// Display strings.
    pub display: DisplaySettings,
    /// Per-site settings.
    pub sites: SitesConfig,
}

/// The schema defaults.
#[must_use]
pub fn default_config() -> UserConfig {
    UserConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_documented_values() -> Result<(), Box<dyn std::error::Error>> {
        let value = serde_json::to_value(default_config())?;
        assert_eq!(
            value,
            json!({
                "features": {
                    "collapse": true,
                    "hwebLinks": true,
                    "keyboardNav": false,
                    "newCommentHighlight": false,
                    "opBadge": true,
                    "deepLink": true,
                    "collapseByDepth": false,
                    "hideReadStories": false,
                    "scoreThreshold": false,
                    "timeGrouping": false,
                    "inlinePreview": false,
                    "darkModeSync": false,
                    "readingProgress": false,
                    "commentBookmarks": false
                },
                "thresholds": {
                    "minScore": 0,
                    "minComments": 0,
                    "gutterClickPx": 15,
                    "autoCollapseDepth": 5,
                    "highScoreThreshold": 100,
                    "lowScoreThreshold": -5
                },
                "display": {
                    "maxContentWidth": "900px",
                    "commentLineHeight": "1.5",
                    "newCommentColor": "#ffffcc"
                },
                "sites": {
                    "hackerweb": { "enabled": true, "features": {} },
                    "hn": { "enabled": true, "features": {} }
                }
            })
        );
        Ok(())
    }

    #[test]
    fn key_names_round_trip_through_from_str() -> Result<(), ConfigError> {
        for feature in Feature::ALL {
            assert_eq!(feature.as_str().parse::<Feature>()?, feature);
            assert_eq!(serde_json::to_value(feature).ok(), Some(json!(feature.as_str())));
        }
        for threshold in Threshold::ALL {
            assert_eq!(threshold.as_str().parse::<Threshold>()?, threshold);
        }
        for key in DisplayKey::ALL {
            assert_eq!(key.as_str().parse::<DisplayKey>()?, key);
        }
        for site in Site::ALL {
            assert_eq!(site.as_str().parse::<Site>()?, site);
        }
        Ok(())
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            "comfortMode".parse::<Feature>(),
            Err(ConfigError::UnknownKey {
                section: ConfigSection::Features,
                key: "comfortMode".to_owned(),
            })
        );
        assert!("reddit".parse::<Site>().is_err());
        assert!("colors".parse::<ConfigSection>().is_err());
    }

    #[test]
    fn flag_accessors_cover_every_feature() {
        let mut flags = FeatureFlags::default();
        for feature in Feature::ALL {
            let before = flags.get(feature);
            flags.set(feature, !before);
            assert_eq!(flags.get(feature), !before, "{feature}");
        }
    }
}
