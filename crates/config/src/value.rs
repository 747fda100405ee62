//! Addressing single config leaves and whole sections.

use crate::errors::ConfigError;
use crate::schema::{
    ConfigSection, DisplayKey, DisplaySettings, Feature, FeatureFlags, Site, SiteConfig,
    SitesConfig, Threshold, Thresholds, UserConfig,
};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Path to one leaf of the resolved config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    /// `features.<feature>`
    Feature(Feature),
    /// `thresholds.<threshold>`
    Threshold(Threshold),
    /// `display.<key>`
    Display(DisplayKey),
    /// `sites.<site>`
    Site(Site),
}

impl ConfigKey {
    /// Section the key lives in.
    #[must_use]
    pub const fn section(self) -> ConfigSection {
        match self {
            Self::Feature(_) => ConfigSection::Features,
            Self::Threshold(_) => ConfigSection::Thresholds,
            Self::Display(_) => ConfigSection::Display,
            Self::Site(_) => ConfigSection::Sites,
        }
    }

    /// Key name inside its section.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Feature(feature) => feature.as_str(),
            Self::Threshold(threshold) => threshold.as_str(),
            Self::Display(key) => key.as_str(),
            Self::Site(site) => site.as_str(),
        }
    }

    /// Resolve a `(section, key)` pair of names.
    pub fn parse(section: &str, key: &str) -> Result<Self, ConfigError> {
        let key = match section.parse::<ConfigSection>()? {
            ConfigSection::Features => Self::Feature(key.parse()?),
            ConfigSection::Thresholds => Self::Threshold(key.parse()?),
            ConfigSection::Display => Self::Display(key.parse()?),
            ConfigSection::Sites => Self::Site(key.parse()?),
        };
        Ok(key)
    }

    /// Every leaf key of the schema.
    pub fn all() -> impl Iterator<Item = Self> {
        Feature::ALL
            .into_iter()
            .map(Self::Feature)
            .chain(Threshold::ALL.into_iter().map(Self::Threshold))
            .chain(DisplayKey::ALL.into_iter().map(Self::Display))
            .chain(Site::ALL.into_iter().map(Self::Site))
    }

    const fn expected_kind(self) -> &'static str {
        match self {
            Self::Feature(_) => "a boolean",
            Self::Threshold(_) => "an integer",
            Self::Display(_) => "a string",
            Self::Site(_) => "a site object",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}.{}", self.section(), self.name())
    }
}

impl From<Feature> for ConfigKey {
    fn from(feature: Feature) -> Self {
        Self::Feature(feature)
    }
}

impl From<Threshold> for ConfigKey {
    fn from(threshold: Threshold) -> Self {
        Self::Threshold(threshold)
    }
}

impl From<DisplayKey> for ConfigKey {
    fn from(key: DisplayKey) -> Self {
        Self::Display(key)
    }
}

impl From<Site> for ConfigKey {
    fn from(site: Site) -> Self {
        Self::Site(site)
    }
}

/// Value of one config leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Feature flag value.
    Bool(bool),
    /// Threshold value.
    Number(i64),
    /// Display value.
    Text(String),
    /// Site settings.
    Site(SiteConfig),
}

impl ConfigValue {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "a boolean",
            Self::Number(_) => "an integer",
            Self::Text(_) => "a string",
            Self::Site(_) => "a site object",
        }
    }

    /// Decode a JSON value for `key`, checking its kind.
    pub fn from_json(key: ConfigKey, value: Value) -> Result<Self, ConfigError> {
        let mismatch = |found: &'static str| ConfigError::TypeMismatch {
            section: key.section(),
            key: key.name(),
            expected: key.expected_kind(),
            found,
        };
        match (key, value) {
            (ConfigKey::Feature(_), Value::Bool(flag)) => Ok(Self::Bool(flag)),
            (ConfigKey::Threshold(_), Value::Number(number)) => {
                number.as_i64().map(Self::Number).ok_or_else(|| mismatch("a non-integer number"))
            },
            (ConfigKey::Display(_), Value::String(text)) => Ok(Self::Text(text)),
            (ConfigKey::Site(_), value @ Value::Object(_)) => serde_json::from_value(value)
                .map(Self::Site)
                .map_err(|error| ConfigError::InvalidValue {
                    section: key.section(),
                    key: key.name(),
                    reason: error.to_string(),
                }),
            (_, other) => Err(mismatch(json_kind(&other))),
        }
    }

    /// Encode as JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Number(number) => Value::from(*number),
            Self::Text(text) => Value::String(text.clone()),
            Self::Site(site) => serde_json::to_value(site).unwrap_or(Value::Null),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<i64> for ConfigValue {
    fn from(number: i64) -> Self {
        Self::Number(number)
    }
}

impl From<String> for ConfigValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ConfigValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<SiteConfig> for ConfigValue {
    fn from(site: SiteConfig) -> Self {
        Self::Site(site)
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Snapshot of one whole section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SectionValue {
    /// `features`
    Features(FeatureFlags),
    /// `thresholds`
    Thresholds(Thresholds),
    /// `display`
    Display(DisplaySettings),
    /// `sites`
    Sites(SitesConfig),
}

impl UserConfig {
    /// Value at `key`.
    #[must_use]
    pub fn get(&self, key: ConfigKey) -> ConfigValue {
        match key {
            ConfigKey::Feature(feature) => ConfigValue::Bool(self.features.get(feature)),
            ConfigKey::Threshold(threshold) => ConfigValue::Number(self.thresholds.get(threshold)),
            ConfigKey::Display(key) => ConfigValue::Text(self.display.get(key).to_owned()),
            ConfigKey::Site(site) => ConfigValue::Site(self.sites.get(site).clone()),
        }
    }

    /// Overwrite the value at `key`. Fails when the value kind does not
    /// match the key.
    pub fn set(&mut self, key: ConfigKey, value: ConfigValue) -> Result<(), ConfigError> {
        match (key, value) {
            (ConfigKey::Feature(feature), ConfigValue::Bool(flag)) => {
                self.features.set(feature, flag);
            },
            (ConfigKey::Threshold(threshold), ConfigValue::Number(number)) => {
                self.thresholds.set(threshold, number);
            },
            (ConfigKey::Display(display), ConfigValue::Text(text)) => {
                self.display.set(display, text);
            },
            (ConfigKey::Site(site), ConfigValue::Site(settings)) => {
                *self.sites.get_mut(site) = settings;
            },
            (key, value) => {
                return Err(ConfigError::TypeMismatch {
                    section: key.section(),
                    key: key.name(),
                    expected: key.expected_kind(),
                    found: value.kind(),
                });
            },
        }
        Ok(())
    }

    /// Snapshot of `section`.
    #[must_use]
    pub fn section(&self, section: ConfigSection) -> SectionValue {
        match section {
            ConfigSection::Features => SectionValue::Features(self.features.clone()),
            ConfigSection::Thresholds => SectionValue::Thresholds(self.thresholds.clone()),
            ConfigSection::Display => SectionValue::Display(self.display.clone()),
            ConfigSection::Sites => SectionValue::Sites(self.sites.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::default_config;
    use serde_json::json;

    #[test]
    fn parses_section_and_key_names() -> Result<(), ConfigError> {
        assert_eq!(
            ConfigKey::parse("features", "keyboardNav")?,
            ConfigKey::Feature(Feature::KeyboardNav)
        );
        assert_eq!(ConfigKey::parse("sites", "hn")?, ConfigKey::Site(Site::Hn));
        assert!(matches!(
            ConfigKey::parse("feature", "collapse"),
            Err(ConfigError::UnknownSection(_))
        ));
        assert!(matches!(
            ConfigKey::parse("display", "fontSize"),
            Err(ConfigError::UnknownKey { .. })
        ));
        Ok(())
    }

    #[test]
    fn json_values_are_kind_checked() {
        let key = ConfigKey::Threshold(Threshold::MinScore);
        assert_eq!(ConfigValue::from_json(key, json!(10)), Ok(ConfigValue::Number(10)));
        assert!(ConfigValue::from_json(key, json!(1.5)).is_err());
        assert!(ConfigValue::from_json(key, json!("10")).is_err());

        let site = ConfigValue::from_json(ConfigKey::Site(Site::Hn), json!({"enabled": false}));
        assert_eq!(
            site,
            Ok(ConfigValue::Site(SiteConfig {
                enabled: false,
                features: std::collections::BTreeMap::new(),
            }))
        );
    }

    #[test]
    fn set_rejects_mismatched_kinds() {
        let mut config = default_config();
        let error = config.set(Feature::Collapse.into(), ConfigValue::Number(1));
        assert_eq!(
            error,
            Err(ConfigError::TypeMismatch {
                section: ConfigSection::Features,
                key: "collapse",
                expected: "a boolean",
                found: "an integer",
            })
        );
        assert_eq!(config, default_config());
    }

    #[test]
    fn every_key_reads_its_default() {
        let config = default_config();
        assert_eq!(ConfigKey::all().count(), 14 + 6 + 3 + 2);
        for key in ConfigKey::all() {
            let value = config.get(key);
            assert_eq!(ConfigValue::from_json(key, value.to_json()), Ok(value));
        }
    }
}
