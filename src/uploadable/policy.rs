use super::generator::FilenameGenerator;
use crate::core::{PolicyError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Facts about an incoming file checked against an upload policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub mime_type: Option<String>,
}

impl FileInfo {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: None,
        }
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Validated upload policy of an entity type. Immutable once built.
#[derive(Clone)]
pub struct UploadPolicy {
    pub(crate) file_path_field: Option<String>,
    pub(crate) file_name_field: Option<String>,
    pub(crate) file_mime_type_field: Option<String>,
    pub(crate) file_size_field: Option<String>,
    pub(crate) path_method: Option<String>,
    pub(crate) callback: Option<String>,
    pub(crate) filename_generator_name: String,
    pub(crate) filename_generator: Arc<dyn FilenameGenerator>,
    pub(crate) max_size: f64,
    pub(crate) allowed_types: Vec<String>,
    pub(crate) disallowed_types: Vec<String>,
    pub(crate) path: Option<PathBuf>,
    pub(crate) allow_overwrite: bool,
    pub(crate) append_number: bool,
}

impl UploadPolicy {
    pub fn file_path_field(&self) -> Option<&str> {
        self.file_path_field.as_deref()
    }

    pub fn file_name_field(&self) -> Option<&str> {
        self.file_name_field.as_deref()
    }

    pub fn file_mime_type_field(&self) -> Option<&str> {
        self.file_mime_type_field.as_deref()
    }

    pub fn file_size_field(&self) -> Option<&str> {
        self.file_size_field.as_deref()
    }

    pub fn path_method(&self) -> Option<&str> {
        self.path_method.as_deref()
    }

    pub fn callback(&self) -> Option<&str> {
        self.callback.as_deref()
    }

    pub fn filename_generator_name(&self) -> &str {
        &self.filename_generator_name
    }

    pub fn max_size(&self) -> f64 {
        self.max_size
    }

    pub fn allowed_types(&self) -> &[String] {
        &self.allowed_types
    }

    pub fn disallowed_types(&self) -> &[String] {
        &self.disallowed_types
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn allow_overwrite(&self) -> bool {
        self.allow_overwrite
    }

    pub fn append_number(&self) -> bool {
        self.append_number
    }

    /// Stored name for a file originally called `original`.
    pub fn generate_file_name(&self, original: &str) -> String {
        self.filename_generator.generate(original)
    }

    /// Checks size and MIME type of an incoming file.
    pub fn check_upload(&self, file: &FileInfo) -> Result<()> {
        if self.max_size > 0.0 && file.size as f64 > self.max_size {
            return Err(PolicyError::MaxSizeExceeded {
                size: file.size,
                max_size: self.max_size,
            });
        }

        let mime = file.mime_type.as_deref().unwrap_or_default();
        if !self.allowed_types.is_empty() && !self.allowed_types.iter().any(|t| t == mime) {
            return Err(PolicyError::InvalidMimeType(mime.to_string()));
        }
        if self.disallowed_types.iter().any(|t| t == mime) {
            return Err(PolicyError::InvalidMimeType(mime.to_string()));
        }

        Ok(())
    }
}

impl fmt::Debug for UploadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadPolicy")
            .field("file_path_field", &self.file_path_field)
            .field("file_name_field", &self.file_name_field)
            .field("file_mime_type_field", &self.file_mime_type_field)
            .field("file_size_field", &self.file_size_field)
            .field("path_method", &self.path_method)
            .field("callback", &self.callback)
            .field("filename_generator", &self.filename_generator_name)
            .field("max_size", &self.max_size)
            .field("allowed_types", &self.allowed_types)
            .field("disallowed_types", &self.disallowed_types)
            .field("path", &self.path)
            .field("allow_overwrite", &self.allow_overwrite)
            .field("append_number", &self.append_number)
            .finish()
    }
}
