use crate::core::Result;
use serde::{Deserialize, Serialize};

/// Raw upload configuration declared for an entity type.
///
/// Keys follow the camelCase names of the declarative mapping. Empty strings
/// count as unset, so a mapping can list every key and leave most blank:
///
/// ```
/// use rustmemodb_lifecycle::UploadConfig;
///
/// let config = UploadConfig::from_json(r#"{
///     "filePathField": "path",
///     "pathMethod": "",
///     "maxSize": 1024,
///     "allowedTypes": "image/png,image/jpeg"
/// }"#).unwrap();
///
/// assert_eq!(config.file_path_field.as_deref(), Some("path"));
/// assert_eq!(config.max_size, 1024.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadConfig {
    pub file_path_field: Option<String>,
    pub file_name_field: Option<String>,
    pub file_mime_type_field: Option<String>,
    pub file_size_field: Option<String>,
    pub path_method: Option<String>,
    pub callback: Option<String>,
    pub filename_generator: Option<String>,
    /// Maximum size in bytes, 0 for unlimited
    pub max_size: f64,
    /// Comma-separated list of accepted MIME types
    pub allowed_types: Option<String>,
    /// Comma-separated list of rejected MIME types
    pub disallowed_types: Option<String>,
    /// Default upload directory
    pub path: Option<String>,
    pub allow_overwrite: bool,
    pub append_number: bool,
}

/// Treats `None` and `Some("")` alike.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Splits a comma-separated MIME list, dropping blanks.
pub(crate) fn split_types(value: &Option<String>) -> Vec<String> {
    non_empty(value)
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl UploadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn file_path_field(mut self, field: impl Into<String>) -> Self {
        self.file_path_field = Some(field.into());
        self
    }

    pub fn file_name_field(mut self, field: impl Into<String>) -> Self {
        self.file_name_field = Some(field.into());
        self
    }

    pub fn file_mime_type_field(mut self, field: impl Into<String>) -> Self {
        self.file_mime_type_field = Some(field.into());
        self
    }

    pub fn file_size_field(mut self, field: impl Into<String>) -> Self {
        self.file_size_field = Some(field.into());
        self
    }

    pub fn path_method(mut self, method: impl Into<String>) -> Self {
        self.path_method = Some(method.into());
        self
    }

    pub fn callback(mut self, method: impl Into<String>) -> Self {
        self.callback = Some(method.into());
        self
    }

    pub fn filename_generator(mut self, generator: impl Into<String>) -> Self {
        self.filename_generator = Some(generator.into());
        self
    }

    pub fn max_size(mut self, max_size: f64) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn allowed_types(mut self, types: impl Into<String>) -> Self {
        self.allowed_types = Some(types.into());
        self
    }

    pub fn disallowed_types(mut self, types: impl Into<String>) -> Self {
        self.disallowed_types = Some(types.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn allow_overwrite(mut self, allow: bool) -> Self {
        self.allow_overwrite = allow;
        self
    }

    pub fn append_number(mut self, append: bool) -> Self {
        self.append_number = append;
        self
    }
}
