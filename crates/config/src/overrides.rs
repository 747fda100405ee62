//! Sparse user overrides and their merge onto the defaults.

use crate::errors::ImportError;
use crate::schema::{ConfigSection, DisplayKey, Feature, Site, SiteConfig, Threshold, UserConfig};
use crate::value::{ConfigKey, ConfigValue};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Partial site settings as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteOverride {
    /// Site switch, when overridden.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Per-site feature values, merged key by key onto the defaults.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<Feature, bool>,
}

impl SiteOverride {
    fn apply(&self, base: &mut SiteConfig) {
        if let Some(enabled) = self.enabled {
            base.enabled = enabled;
        }
        base.features
            .extend(self.features.iter().map(|(feature, value)| (*feature, *value)));
    }

    fn from_json_lenient(site: Site, entries: Map<String, Value>) -> Self {
        let mut decoded = Self::default();
        for (name, value) in entries {
            match (name.as_str(), value) {
                ("enabled", Value::Bool(enabled)) => decoded.enabled = Some(enabled),
                ("features", Value::Object(features)) => {
                    for (feature, flag) in features {
                        let path = format!("{site}.features.{feature}");
                        match (feature.parse::<Feature>(), flag) {
                            (Ok(feature), Value::Bool(flag)) => {
                                decoded.features.insert(feature, flag);
                            },
                            (Ok(_), _) => skip_entry(ConfigSection::Sites, &path, "expected a boolean"),
                            (Err(_), _) => skip_entry(ConfigSection::Sites, &path, "unknown feature"),
                        }
                    }
                },
                ("enabled", _) => {
                    skip_entry(ConfigSection::Sites, &format!("{site}.enabled"), "expected a boolean");
                },
                ("features", _) => {
                    skip_entry(ConfigSection::Sites, &format!("{site}.features"), "expected an object");
                },
                (other, _) => {
                    skip_entry(ConfigSection::Sites, &format!("{site}.{other}"), "unknown site setting");
                },
            }
        }
        decoded
    }

    fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.features.is_empty()
    }
}

impl From<SiteConfig> for SiteOverride {
    fn from(site: SiteConfig) -> Self {
        Self {
            enabled: Some(site.enabled),
            features: site.features,
        }
    }
}

/// The sparse diff from defaults. Empty sections are omitted when
/// serialized, so a removed last key prunes its section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigOverrides {
    /// Feature overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<Feature, bool>,
    /// Threshold overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub thresholds: BTreeMap<Threshold, i64>,
    /// Display overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub display: BTreeMap<DisplayKey, String>,
    /// Site overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sites: BTreeMap<Site, SiteOverride>,
}

impl ConfigOverrides {
    /// Returns true when nothing is overridden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
            && self.thresholds.is_empty()
            && self.display.is_empty()
            && self.sites.is_empty()
    }

    /// Returns true when `key` carries an override.
    #[must_use]
    pub fn contains(&self, key: ConfigKey) -> bool {
        match key {
            ConfigKey::Feature(feature) => self.features.contains_key(&feature),
            ConfigKey::Threshold(threshold) => self.thresholds.contains_key(&threshold),
            ConfigKey::Display(display) => self.display.contains_key(&display),
            ConfigKey::Site(site) => self.sites.contains_key(&site),
        }
    }

    /// Record `value` at `key`. The caller guarantees the kinds match;
    /// mismatches are ignored.
    pub fn insert(&mut self, key: ConfigKey, value: ConfigValue) {
        match (key, value) {
            (ConfigKey::Feature(feature), ConfigValue::Bool(flag)) => {
                self.features.insert(feature, flag);
            },
            (ConfigKey::Threshold(threshold), ConfigValue::Number(number)) => {
                self.thresholds.insert(threshold, number);
            },
            (ConfigKey::Display(display), ConfigValue::Text(text)) => {
                self.display.insert(display, text);
            },
            (ConfigKey::Site(site), ConfigValue::Site(settings)) => {
                self.sites.insert(site, settings.into());
            },
            _ => {},
        }
    }

    /// Drop the override at `key`; returns true when one existed.
    pub fn remove(&mut self, key: ConfigKey) -> bool {
        match key {
            ConfigKey::Feature(feature) => self.features.remove(&feature).is_some(),
            ConfigKey::Threshold(threshold) => self.thresholds.remove(&threshold).is_some(),
            ConfigKey::Display(display) => self.display.remove(&display).is_some(),
            ConfigKey::Site(site) => self.sites.remove(&site).is_some(),
        }
    }

    /// Sections that currently carry at least one override.
    #[must_use]
    pub fn sections(&self) -> Vec<ConfigSection> {
        ConfigSection::ALL
            .into_iter()
            .filter(|section| match section {
                ConfigSection::Features => !self.features.is_empty(),
                ConfigSection::Thresholds => !self.thresholds.is_empty(),
                ConfigSection::Display => !self.display.is_empty(),
                ConfigSection::Sites => !self.sites.is_empty(),
            })
            .collect()
    }

    /// Decode overrides from a raw persisted or imported object.
    ///
    /// Only structure is enforced: every top-level key must be a known
    /// section holding an object. Entries are decoded one at a time, and
    /// unknown keys or values of the wrong kind are skipped with a warning
    /// while every decodable override is kept.
    pub fn from_json_object(object: Map<String, Value>) -> Result<Self, ImportError> {
        let mut sections = Vec::with_capacity(object.len());
        for (name, section) in object {
            let Ok(parsed) = name.parse::<ConfigSection>() else {
                return Err(ImportError::UnknownSection(name));
            };
            let Value::Object(entries) = section else {
                return Err(ImportError::SectionNotObject(name));
            };
            sections.push((parsed, entries));
        }

        let mut overrides = Self::default();
        for (section, entries) in sections {
            for (name, value) in entries {
                overrides.insert_json(section, &name, value);
            }
        }
        Ok(overrides)
    }

    fn insert_json(&mut self, section: ConfigSection, name: &str, value: Value) {
        let key = match ConfigKey::parse(section.as_str(), name) {
            Ok(key) => key,
            Err(error) => return skip_entry(section, name, &error.to_string()),
        };
        if let ConfigKey::Site(site) = key {
            match value {
                Value::Object(entries) => {
                    let site_override = SiteOverride::from_json_lenient(site, entries);
                    if !site_override.is_empty() {
                        self.sites.insert(site, site_override);
                    }
                },
                _ => skip_entry(section, name, "expected a site object"),
            }
            return;
        }
        match ConfigValue::from_json(key, value) {
            Ok(value) => self.insert(key, value),
            Err(error) => skip_entry(section, name, &error.to_string()),
        }
    }
}

fn skip_entry(section: ConfigSection, key: &str, reason: &str) {
    warn!(target: "hwt::config", %section, key, reason, "skipping config entry");
}

/// Resolve `overrides` onto `defaults`, section by section.
#[must_use]
pub fn merge(defaults: &UserConfig, overrides: &ConfigOverrides) -> UserConfig {
    let mut resolved = defaults.clone();
    for (feature, enabled) in &overrides.features {
        resolved.features.set(*feature, *enabled);
    }
    for (threshold, value) in &overrides.thresholds {
        resolved.thresholds.set(*threshold, *value);
    }
    for (key, value) in &overrides.display {
        resolved.display.set(*key, value.clone());
    }
    for (site, site_override) in &overrides.sites {
        site_override.apply(resolved.sites.get_mut(*site));
    }
    resolved
}
