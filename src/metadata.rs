use crate::core::{DataType, PolicyError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Declared mapping of one entity field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl FieldMapping {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// Reflective view of an entity type consumed by the validators.
pub trait EntityMetadata: Send + Sync {
    /// Name the entity type is registered under.
    fn entity_type(&self) -> &str;

    /// Looks up the declared mapping of `field`.
    fn field_mapping(&self, field: &str) -> Result<&FieldMapping>;

    /// Names of the methods declared on the entity type.
    fn declared_methods(&self) -> &BTreeSet<String>;

    fn has_method(&self, method: &str) -> bool {
        self.declared_methods().contains(method)
    }
}

/// Metadata built by hand at registration time.
///
/// ```
/// use rustmemodb_lifecycle::{ClassMetadata, DataType};
///
/// let meta = ClassMetadata::new("User")
///     .field("username", DataType::Text)
///     .field("deletedAt", DataType::DateTime)
///     .method("getUploadPath");
///
/// assert!(meta.get_field("deletedAt").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ClassMetadata {
    entity_type: String,
    fields: BTreeMap<String, FieldMapping>,
    methods: BTreeSet<String>,
}

impl ClassMetadata {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            fields: BTreeMap::new(),
            methods: BTreeSet::new(),
        }
    }

    pub fn field(self, name: impl Into<String>, data_type: DataType) -> Self {
        self.mapping(FieldMapping::new(name, data_type))
    }

    pub fn mapping(mut self, mapping: FieldMapping) -> Self {
        self.fields.insert(mapping.name.clone(), mapping);
        self
    }

    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.methods.insert(name.into());
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldMapping> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldMapping> {
        self.fields.values()
    }
}

impl EntityMetadata for ClassMetadata {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn field_mapping(&self, field: &str) -> Result<&FieldMapping> {
        self.fields.get(field).ok_or_else(|| {
            PolicyError::InvalidMapping(format!(
                "No mapping found for field '{}' in class '{}'",
                field, self.entity_type
            ))
        })
    }

    fn declared_methods(&self) -> &BTreeSet<String> {
        &self.methods
    }
}
