//! Labels, groupings, and advisory ranges for a settings surface.
//!
//! Nothing here is enforced by the store; ranges only describe what a
//! settings UI should offer.

use crate::schema::{DisplayKey, Feature, Threshold};
use serde::Serialize;

/// Settings-panel grouping of features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureGroup {
    /// Thread basics.
    Core,
    /// Reading aids.
    Reading,
    /// Visual tweaks.
    Visual,
    /// Features for the original news site.
    HnSpecific,
}

impl FeatureGroup {
    /// Every group, in display order.
    pub const ALL: [Self; 4] = [Self::Core, Self::Reading, Self::Visual, Self::HnSpecific];

    /// Human-readable group label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Core => "Core",
            Self::Reading => "Reading",
            Self::Visual => "Visual",
            Self::HnSpecific => "HN Features",
        }
    }

    /// Member features in display order.
    #[must_use]
    pub const fn members(self) -> &'static [Feature] {
        match self {
            Self::Core => &[
                Feature::Collapse,
                Feature::KeyboardNav,
                Feature::OpBadge,
                Feature::DeepLink,
            ],
            Self::Reading => &[
                Feature::NewCommentHighlight,
                Feature::ReadingProgress,
                Feature::CommentBookmarks,
            ],
            Self::Visual => &[Feature::DarkModeSync, Feature::CollapseByDepth],
            Self::HnSpecific => &[
                Feature::HideReadStories,
                Feature::ScoreThreshold,
                Feature::TimeGrouping,
                Feature::InlinePreview,
                Feature::HwebLinks,
            ],
        }
    }
}

/// Describes one feature toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureMeta {
    /// Short label.
    pub label: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Group the feature is listed under.
    pub group: FeatureGroup,
}

impl Feature {
    /// Label, description, and group for this feature.
    #[must_use]
    pub const fn meta(self) -> FeatureMeta {
        let (label, description) = match self {
            Self::Collapse => ("Collapse threads", "Click to collapse/expand comment threads"),
            Self::KeyboardNav => ("Keyboard nav", "j/k to navigate, o to open links"),
            Self::OpBadge => ("OP badge", "Highlight comments by the original poster"),
            Self::DeepLink => ("Deep linking", "URL updates when viewing comments"),
            Self::NewCommentHighlight => (
                "New comment highlight",
                "Highlight unread comments since last visit",
            ),
            Self::ReadingProgress => ("Reading progress", "Show progress bar while scrolling"),
            Self::CommentBookmarks => ("Comment bookmarks", "Save comments for later reading"),
            Self::DarkModeSync => ("Dark mode sync", "Match system dark/light preference"),
            Self::CollapseByDepth => ("Auto-collapse by depth", "Collapse deeply nested comments"),
            Self::HideReadStories => ("Hide read stories", "Hide stories you've already viewed"),
            Self::ScoreThreshold => ("Score threshold", "Dim low-scoring comments"),
            Self::TimeGrouping => ("Time grouping", "Group stories by time period"),
            Self::InlinePreview => ("Inline preview", "Preview links without leaving the page"),
            Self::HwebLinks => ("HackerWeb links", "Add links to view on HackerWeb"),
        };
        FeatureMeta {
            label,
            description,
            group: self.group(),
        }
    }

    /// Group the feature is listed under.
    #[must_use]
    pub const fn group(self) -> FeatureGroup {
        match self {
            Self::Collapse | Self::KeyboardNav | Self::OpBadge | Self::DeepLink => {
                FeatureGroup::Core
            },
            Self::NewCommentHighlight | Self::ReadingProgress | Self::CommentBookmarks => {
                FeatureGroup::Reading
            },
            Self::DarkModeSync | Self::CollapseByDepth => FeatureGroup::Visual,
            Self::HideReadStories
            | Self::ScoreThreshold
            | Self::TimeGrouping
            | Self::InlinePreview
            | Self::HwebLinks => FeatureGroup::HnSpecific,
        }
    }
}

/// Inclusive UI range for a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdRange {
    /// Lowest offered value.
    pub min: i64,
    /// Highest offered value.
    pub max: i64,
    /// Increment between offered values.
    pub step: i64,
}

impl ThresholdRange {
    /// Returns true when `value` lies inside the range (step ignored).
    #[must_use]
    pub const fn contains(self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Describes one threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdMeta {
    /// Short label.
    pub label: &'static str,
    /// Advisory range.
    pub range: ThresholdRange,
}

impl Threshold {
    /// Label and advisory range for this threshold.
    #[must_use]
    pub const fn meta(self) -> ThresholdMeta {
        let (label, min, max, step) = match self {
            Self::AutoCollapseDepth => ("Auto-collapse depth", 1, 20, 1),
            Self::GutterClickPx => ("Gutter click width (px)", 5, 50, 1),
            Self::HighScoreThreshold => ("High score threshold", 10, 500, 10),
            Self::LowScoreThreshold => ("Low score threshold", -100, 0, 1),
            Self::MinScore => ("Minimum score", -100, 100, 1),
            Self::MinComments => ("Minimum comments", 0, 100, 1),
        };
        ThresholdMeta {
            label,
            range: ThresholdRange { min, max, step },
        }
    }
}

/// Input kind for a display setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayKind {
    /// Free text.
    Text,
    /// A CSS color.
    Color,
}

/// Describes one display setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayMeta {
    /// Short label.
    pub label: &'static str,
    /// Input kind.
    pub kind: DisplayKind,
}

impl DisplayKey {
    /// Label and input kind for this display setting.
    #[must_use]
    pub const fn meta(self) -> DisplayMeta {
        match self {
            Self::MaxContentWidth => DisplayMeta {
                label: "Max content width",
                kind: DisplayKind::Text,
            },
            Self::CommentLineHeight => DisplayMeta {
                label: "Comment line height",
                kind: DisplayKind::Text,
            },
            Self::NewCommentColor => DisplayMeta {
                label: "New comment color",
                kind: DisplayKind::Color,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::default_config;
    use std::collections::BTreeSet;

    #[test]
    fn every_feature_is_in_exactly_its_group() {
        let mut seen = BTreeSet::new();
        for group in FeatureGroup::ALL {
            for feature in group.members() {
                assert_eq!(feature.group(), group, "{feature}");
                assert!(seen.insert(*feature), "{feature} listed twice");
            }
        }
        assert_eq!(seen.len(), Feature::ALL.len());
    }

    #[test]
    fn defaults_fall_inside_advisory_ranges() {
        let defaults = default_config();
        for threshold in Threshold::ALL {
            let meta = threshold.meta();
            assert!(
                meta.range.contains(defaults.thresholds.get(threshold)),
                "{threshold} default outside {:?}",
                meta.range
            );
        }
    }

    #[test]
    fn color_settings_are_marked() {
        assert_eq!(DisplayKey::NewCommentColor.meta().kind, DisplayKind::Color);
        assert_eq!(DisplayKey::MaxContentWidth.meta().kind, DisplayKind::Text);
        assert_eq!(Feature::HwebLinks.meta().label, "HackerWeb links");
    }
}
