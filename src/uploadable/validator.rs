//! Upload mapping validator
//!
//! Certifies an `UploadConfig` against the entity's metadata before the
//! entity type is accepted. Every rule fails fast with `InvalidMapping`.

use super::config::{UploadConfig, non_empty, split_types};
use super::generator::{FILENAME_GENERATOR_NONE, FilenameGeneratorRegistry};
use super::policy::UploadPolicy;
use crate::config::{TargetFieldRule, ValidatorConfig};
use crate::core::{DataType, PolicyError, Result};
use crate::metadata::EntityMetadata;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const VALID_FILE_MIME_TYPE_TYPES: &[DataType] = &[DataType::Text];
pub const VALID_FILE_NAME_TYPES: &[DataType] = &[DataType::Text];
pub const VALID_FILE_PATH_TYPES: &[DataType] = &[DataType::Text];
pub const VALID_FILE_SIZE_TYPES: &[DataType] = &[DataType::Decimal];

/// Role a mapped field plays in an upload policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadableField {
    FileMimeType,
    FileName,
    FilePath,
    FileSize,
}

impl UploadableField {
    pub fn valid_types(&self) -> &'static [DataType] {
        match self {
            Self::FileMimeType => VALID_FILE_MIME_TYPE_TYPES,
            Self::FileName => VALID_FILE_NAME_TYPES,
            Self::FilePath => VALID_FILE_PATH_TYPES,
            Self::FileSize => VALID_FILE_SIZE_TYPES,
        }
    }
}

impl fmt::Display for UploadableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileMimeType => write!(f, "FileMimeType"),
            Self::FileName => write!(f, "FileName"),
            Self::FilePath => write!(f, "FilePath"),
            Self::FileSize => write!(f, "FileSize"),
        }
    }
}

/// Fails unless `field` is mapped with one of `allowed` types.
pub fn validate_field(
    metadata: &dyn EntityMetadata,
    field: &str,
    role: UploadableField,
    allowed: &[DataType],
) -> Result<()> {
    let mapping = metadata.field_mapping(field)?;
    if !allowed.contains(&mapping.data_type) {
        let allowed = allowed
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(PolicyError::InvalidMapping(format!(
            "Field '{}' to work as an 'Uploadable{}' field must be of one of the following types: '{}' in class '{}'.",
            field,
            role,
            allowed,
            metadata.entity_type()
        )));
    }
    Ok(())
}

/// Ensures `path` names a writable directory, creating it and any missing
/// parents first. Calling it again on an existing directory is a no-op.
pub fn validate_path(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(PolicyError::InvalidPath(
            "Path must contain the path to a valid directory.".to_string(),
        ));
    }

    if !path.is_dir() {
        fs::create_dir_all(path).map_err(|err| {
            PolicyError::InvalidPath(format!(
                "Unable to create '{}' directory: {}",
                path.display(),
                err
            ))
        })?;
        debug!(path = %path.display(), "upload directory created");
    }

    let metadata = fs::metadata(path).map_err(|err| {
        PolicyError::InvalidPath(format!("Unable to inspect '{}': {}", path.display(), err))
    })?;
    if metadata.permissions().readonly() {
        return Err(PolicyError::NotWritable(path.display().to_string()));
    }

    Ok(())
}

/// Validator for upload configurations.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validates `config` for the entity described by `metadata` and builds
    /// the policy. Generators resolve against `generators`.
    pub fn validate_configuration(
        &self,
        metadata: &dyn EntityMetadata,
        config: &UploadConfig,
        generators: &FilenameGeneratorRegistry,
    ) -> Result<UploadPolicy> {
        let class = metadata.entity_type();
        let file_path_field = non_empty(&config.file_path_field);
        let file_name_field = non_empty(&config.file_name_field);

        match (self.config.target_field_rule, file_path_field, file_name_field) {
            (_, None, None) => {
                return Err(PolicyError::InvalidMapping(format!(
                    "Class '{}' must define at least one of the 'UploadableFilePath' or 'UploadableFileName' fields.",
                    class
                )));
            }
            (TargetFieldRule::ExactlyOne, Some(_), Some(_)) => {
                return Err(PolicyError::InvalidMapping(format!(
                    "Class '{}' must define only one of the 'UploadableFilePath' or 'UploadableFileName' fields.",
                    class
                )));
            }
            _ => {}
        }

        let path_method = non_empty(&config.path_method);
        if let Some(method) = path_method
            && !metadata.has_method(method)
        {
            return Err(PolicyError::InvalidMapping(format!(
                "Class '{}' doesn't have method '{}' to use as the upload path method.",
                class, method
            )));
        }

        let callback = non_empty(&config.callback);
        if let Some(method) = callback
            && !metadata.has_method(method)
        {
            return Err(PolicyError::InvalidMapping(format!(
                "Class '{}' doesn't have method '{}' to use as the upload callback.",
                class, method
            )));
        }

        let generator_name = non_empty(&config.filename_generator).unwrap_or(FILENAME_GENERATOR_NONE);
        let filename_generator = generators.resolve(generator_name)?;

        if config.max_size.is_nan() || config.max_size < 0.0 {
            return Err(PolicyError::InvalidMapping(format!(
                "Option 'maxSize' must be a number >= 0 for class '{}'.",
                class
            )));
        }

        let allowed_types = split_types(&config.allowed_types);
        let disallowed_types = split_types(&config.disallowed_types);
        if self.config.enforce_mime_type_exclusivity
            && !allowed_types.is_empty()
            && !disallowed_types.is_empty()
        {
            return Err(PolicyError::InvalidMapping(format!(
                "You've set 'allowedTypes' and 'disallowedTypes' options. You must set only one in class '{}'.",
                class
            )));
        }

        let roles = [
            (file_name_field, UploadableField::FileName),
            (file_path_field, UploadableField::FilePath),
            (non_empty(&config.file_mime_type_field), UploadableField::FileMimeType),
            (non_empty(&config.file_size_field), UploadableField::FileSize),
        ];
        for (field, role) in roles {
            if let Some(field) = field {
                validate_field(metadata, field, role, role.valid_types())?;
            }
        }

        let path = match non_empty(&config.path) {
            Some(path) => {
                validate_path(path)?;
                Some(PathBuf::from(path))
            }
            None => None,
        };

        debug!(entity_type = %class, generator = %generator_name, "upload configuration validated");

        Ok(UploadPolicy {
            file_path_field: file_path_field.map(str::to_string),
            file_name_field: file_name_field.map(str::to_string),
            file_mime_type_field: non_empty(&config.file_mime_type_field).map(str::to_string),
            file_size_field: non_empty(&config.file_size_field).map(str::to_string),
            path_method: path_method.map(str::to_string),
            callback: callback.map(str::to_string),
            filename_generator_name: generator_name.to_string(),
            filename_generator,
            max_size: config.max_size,
            allowed_types,
            disallowed_types,
            path,
            allow_overwrite: config.allow_overwrite,
            append_number: config.append_number,
        })
    }
}
