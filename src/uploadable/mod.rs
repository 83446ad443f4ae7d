//! Upload metadata attached to persisted entities.

pub mod config;
pub mod generator;
pub mod policy;
pub mod validator;

pub use config::UploadConfig;
pub use generator::{
    AlphanumericGenerator, FILENAME_GENERATOR_ALPHANUMERIC, FILENAME_GENERATOR_NONE,
    FILENAME_GENERATOR_SHA256, FilenameGenerator, FilenameGeneratorRegistry, NoneGenerator,
    Sha256Generator,
};
pub use policy::{FileInfo, UploadPolicy};
pub use validator::{
    UploadableField, VALID_FILE_MIME_TYPE_TYPES, VALID_FILE_NAME_TYPES, VALID_FILE_PATH_TYPES,
    VALID_FILE_SIZE_TYPES, Validator, validate_field, validate_path,
};
