use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuillError {
    /// Missing or invalid backend configuration. Never touches the active store.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audit store not initialized, call initialize first")]
    NotInitialized,

    /// Backing file or database could not be opened, created or is closed.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The record was not persisted.
    #[error("Write failure: {0}")]
    Write(String),

    /// Retrieval failed as a whole; no partial results are returned.
    #[error("Read failure: {0}")]
    Read(String),
}

impl QuillError {
    /// Wrap an I/O error raised while persisting a record.
    pub fn write(context: &str, err: impl std::fmt::Display) -> Self {
        QuillError::Write(format!("{}: {}", context, err))
    }

    /// Wrap an I/O or query error raised while reading records.
    pub fn read(context: &str, err: impl std::fmt::Display) -> Self {
        QuillError::Read(format!("{}: {}", context, err))
    }

    pub fn unavailable(context: &str, err: impl std::fmt::Display) -> Self {
        QuillError::StorageUnavailable(format!("{}: {}", context, err))
    }

    /// True for failures that happen before any storage is touched.
    pub fn is_config(&self) -> bool {
        matches!(self, QuillError::Config(_))
    }
}

impl From<io::Error> for QuillError {
    fn from(err: io::Error) -> Self {
        QuillError::StorageUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuillError>;
