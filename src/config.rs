use crate::core::Result;
use serde::{Deserialize, Serialize};

/// How many of `filePathField` / `fileNameField` an upload policy must set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetFieldRule {
    #[default]
    AtLeastOne,
    ExactlyOne,
}

/// Rules applied by the upload configuration validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Reject policies that set both `allowedTypes` and `disallowedTypes`.
    pub enforce_mime_type_exclusivity: bool,
    pub target_field_rule: TargetFieldRule,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            enforce_mime_type_exclusivity: true,
            target_field_rule: TargetFieldRule::AtLeastOne,
        }
    }
}

impl ValidatorConfig {
    pub fn enforce_mime_type_exclusivity(mut self, enforce: bool) -> Self {
        self.enforce_mime_type_exclusivity = enforce;
        self
    }

    pub fn target_field_rule(mut self, rule: TargetFieldRule) -> Self {
        self.target_field_rule = rule;
        self
    }
}

/// Engine configuration
///
/// Built with the builder methods or loaded from JSON:
///
/// ```
/// use rustmemodb_lifecycle::EngineConfig;
///
/// let config = EngineConfig::from_json(r#"{
///     "filter_enabled_by_default": true,
///     "time_aware_filtering": false,
///     "validator": { "enforce_mime_type_exclusivity": false }
/// }"#).unwrap();
///
/// assert!(!config.time_aware_filtering);
/// assert!(!config.validator.enforce_mime_type_exclusivity);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upload configuration validation rules
    pub validator: ValidatorConfig,

    /// Whether new sessions start with the soft-delete filter switched on
    pub filter_enabled_by_default: bool,

    /// Whether the backing store can evaluate time-aware visibility.
    /// Time-aware soft-delete policies are rejected at registration when false.
    pub time_aware_filtering: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            validator: ValidatorConfig::default(),
            filter_enabled_by_default: true,
            time_aware_filtering: true,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a JSON document; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set validator rules
    pub fn validator(mut self, validator: ValidatorConfig) -> Self {
        self.validator = validator;
        self
    }

    /// Set whether sessions start with the filter enabled
    pub fn filter_enabled_by_default(mut self, enabled: bool) -> Self {
        self.filter_enabled_by_default = enabled;
        self
    }

    /// Set time-aware filtering support
    pub fn time_aware_filtering(mut self, supported: bool) -> Self {
        self.time_aware_filtering = supported;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.filter_enabled_by_default);
        assert!(config.time_aware_filtering);
        assert!(config.validator.enforce_mime_type_exclusivity);
        assert_eq!(config.validator.target_field_rule, TargetFieldRule::AtLeastOne);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .filter_enabled_by_default(false)
            .validator(ValidatorConfig::default().target_field_rule(TargetFieldRule::ExactlyOne));

        assert!(!config.filter_enabled_by_default);
        assert_eq!(config.validator.target_field_rule, TargetFieldRule::ExactlyOne);
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(
            r#"{ "validator": { "target_field_rule": "exactly_one" } }"#,
        )
        .unwrap();
        assert_eq!(config.validator.target_field_rule, TargetFieldRule::ExactlyOne);
        assert!(config.validator.enforce_mime_type_exclusivity);
        assert!(config.filter_enabled_by_default);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(EngineConfig::from_json("{ not json").is_err());
    }
}
