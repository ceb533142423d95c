//! Error types for trial record loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading raw trial records.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Parsing Errors ===
    /// File is not a valid trial record or study document.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// File contents describe a different trial than its name.
    #[error("{path} contains trial {found}, expected {expected}")]
    IdMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    // === Request Errors ===
    #[error(transparent)]
    Comparison(#[from] trial_model::ComparisonError),
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
