use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Directory '{0}' is not writable")]
    NotWritable(String),

    #[error("File size {size} exceeds the maximum of {max_size} bytes")]
    MaxSizeExceeded { size: u64, max_size: f64 },

    #[error("MIME type '{0}' is not allowed")]
    InvalidMimeType(String),

    #[error("Entity type '{0}' is not registered")]
    EntityTypeNotRegistered(String),

    #[error("Entity type '{0}' is already registered")]
    EntityTypeExists(String),

    #[error("Entity '{1}' of type '{0}' not found")]
    EntityNotFound(String, String),

    #[error("Entity '{1}' of type '{0}' already exists")]
    DuplicateEntity(String, String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, PolicyError>;

impl<T> From<std::sync::PoisonError<T>> for PolicyError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}

impl From<serde_json::Error> for PolicyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
