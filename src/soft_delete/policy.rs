use crate::core::{PolicyError, Result};
use crate::metadata::EntityMetadata;
use serde::{Deserialize, Serialize};

const fn default_hard_delete() -> bool {
    true
}

/// Raw soft-delete configuration, as declared for an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftDeleteConfig {
    #[serde(default)]
    pub field_name: Option<String>,
    #[serde(default)]
    pub time_aware: bool,
    #[serde(default = "default_hard_delete")]
    pub hard_delete: bool,
}

impl SoftDeleteConfig {
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: Some(field_name.into()),
            time_aware: false,
            hard_delete: default_hard_delete(),
        }
    }

    pub fn time_aware(mut self, time_aware: bool) -> Self {
        self.time_aware = time_aware;
        self
    }

    pub fn hard_delete(mut self, hard_delete: bool) -> Self {
        self.hard_delete = hard_delete;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validates the configuration against the entity's metadata.
    ///
    /// `time_aware_supported` reflects whether the store can evaluate
    /// time-aware visibility; time-aware policies are refused otherwise.
    pub fn validate(
        &self,
        metadata: &dyn EntityMetadata,
        time_aware_supported: bool,
    ) -> Result<SoftDeletePolicy> {
        let field = match self.field_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(PolicyError::InvalidMapping(format!(
                    "Field name for SoftDeleteable class '{}' is mandatory.",
                    metadata.entity_type()
                )));
            }
        };

        let mapping = metadata.field_mapping(field)?;
        if !mapping.data_type.is_temporal() {
            return Err(PolicyError::InvalidMapping(format!(
                "Field '{}' of type '{}' is not valid in class '{}': it must be 'date', 'datetime', 'datetimetz' or 'timestamp'.",
                field,
                mapping.data_type,
                metadata.entity_type()
            )));
        }

        if self.time_aware && !time_aware_supported {
            return Err(PolicyError::InvalidMapping(format!(
                "Class '{}' requests time-aware soft deletion, which the configured store does not support.",
                metadata.entity_type()
            )));
        }

        Ok(SoftDeletePolicy {
            field: field.to_string(),
            time_aware: self.time_aware,
            hard_delete: self.hard_delete,
        })
    }
}

/// Validated soft-delete policy of an entity type. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftDeletePolicy {
    field: String,
    time_aware: bool,
    hard_delete: bool,
}

impl SoftDeletePolicy {
    #[cfg(test)]
    pub(crate) fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            time_aware: false,
            hard_delete: true,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_time_aware(mut self) -> Self {
        self.time_aware = true;
        self
    }

    /// Field holding the deletion timestamp.
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn is_time_aware(&self) -> bool {
        self.time_aware
    }

    /// Whether deleting an already soft-deleted record removes it physically.
    pub fn is_hard_delete(&self) -> bool {
        self.hard_delete
    }
}
