use thiserror::Error;

/// Failures of the injected key-value medium or of the table encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("failed to read key {key}: {message}")]
    Read { key: String, message: String },
    #[error("failed to write key {key}: {message}")]
    Write { key: String, message: String },
    #[error("failed to encode credential table: {0}")]
    Serialization(String),
}
