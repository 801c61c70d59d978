//! Error types and error handling for warcdex.
//!
//! Errors fall into three tiers. Record-level and file-level errors are
//! recovered locally by the ingestion pipeline (skip and continue),
//! everything else terminates the run.

use thiserror::Error;

/// Result type alias for warcdex operations
pub type Result<T> = std::result::Result<T, WarcdexError>;

/// Main error type for warcdex
#[derive(Error, Debug)]
pub enum WarcdexError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Decompression failed: {0}")]
    Decompression(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Record is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Progress ledger error: {0}")]
    LedgerError(String),

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Indexing failed: {0}")]
    IndexingFailed(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl WarcdexError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// A single record could not be turned into a document.
    /// The record is dropped and the rest of the file continues.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            WarcdexError::MalformedRecord(_) | WarcdexError::MissingField(_)
        )
    }

    /// A whole archive file could not be processed. The file stays out
    /// of the progress ledger and is retried on the next run.
    pub fn is_file_level(&self) -> bool {
        matches!(
            self,
            WarcdexError::Decompression(_) | WarcdexError::IndexingFailed(_)
        )
    }

    /// Anything that is neither record- nor file-level ends the run
    pub fn is_fatal(&self) -> bool {
        !self.is_record_level() && !self.is_file_level()
    }
}
