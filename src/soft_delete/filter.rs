use super::SoftDeletePolicy;
use crate::core::{Condition, Criteria};
use std::collections::HashSet;

/// Session-scoped filter hiding soft-deleted records from reads.
///
/// The filter as a whole can be switched on and off, and while it is on it
/// can still be disabled for individual entity types. Nothing here is
/// persisted; every new session starts from the engine default.
#[derive(Debug, Clone)]
pub struct VisibilityFilter {
    enabled: bool,
    disabled_types: HashSet<String>,
}

impl VisibilityFilter {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            disabled_types: HashSet::new(),
        }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn disable_for_entity(&mut self, entity_type: impl Into<String>) {
        self.disabled_types.insert(entity_type.into());
    }

    pub fn enable_for_entity(&mut self, entity_type: &str) {
        self.disabled_types.remove(entity_type);
    }

    pub fn is_enabled_for(&self, entity_type: &str) -> bool {
        self.enabled && !self.disabled_types.contains(entity_type)
    }

    /// Adds the visibility predicate to `criteria` when the filter applies to
    /// `entity_type`. Types without a policy pass through untouched.
    pub fn apply(
        &self,
        entity_type: &str,
        policy: Option<&SoftDeletePolicy>,
        criteria: Criteria,
    ) -> Criteria {
        let Some(policy) = policy else {
            return criteria;
        };
        if !self.is_enabled_for(entity_type) {
            return criteria;
        }

        let field = policy.field().to_string();
        if policy.is_time_aware() {
            criteria.and(Condition::IsNullOrAfterNow(field))
        } else {
            criteria.and(Condition::IsNull(field))
        }
    }
}

impl Default for VisibilityFilter {
    fn default() -> Self {
        Self::new(true)
    }
}
