use super::Value;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

static NULL_VALUE: Value = Value::Null;

/// A single persisted entity instance: its type, identity and field values.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    entity_type: String,
    id: Uuid,
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self::with_id(entity_type, Uuid::new_v4())
    }

    pub fn with_id(entity_type: impl Into<String>, id: Uuid) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field assignment.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the field value, `Value::Null` when unset.
    pub fn get(&self, name: &str) -> &Value {
        self.fields.get(name).unwrap_or(&NULL_VALUE)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }
}

/// A predicate over record fields, evaluated by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String, Value),
    IsNull(String),
    /// Field is NULL or holds a timestamp later than the evaluating clock's now.
    IsNullOrAfterNow(String),
}

impl Condition {
    pub fn matches(&self, record: &Record, now: DateTime<Utc>) -> bool {
        match self {
            Condition::Eq(field, expected) => record.get(field) == expected,
            Condition::IsNull(field) => record.get(field).is_null(),
            Condition::IsNullOrAfterNow(field) => match record.get(field) {
                Value::Null => true,
                Value::Timestamp(ts) => *ts > now,
                _ => false,
            },
        }
    }
}

/// Conjunction of conditions used by `find_one_by` / `find_by`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    conditions: Vec<Condition>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(field.into(), value.into()));
        self
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, record: &Record, now: DateTime<Utc>) -> bool {
        self.conditions.iter().all(|c| c.matches(record, now))
    }
}
