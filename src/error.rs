//! Error types for the coverage engine.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the coverage engine's error type.
pub type Result<T> = std::result::Result<T, CoverageError>;

/// Errors raised while loading, summarizing or diffing coverage.
#[derive(Error, Debug)]
pub enum CoverageError {
    /// The selected run identifier is not present in the result set.
    #[error("run '{run}' not found in result set (available: {available})")]
    MissingRun { run: String, available: String },

    /// A diff entry was requested for a file that neither snapshot contains.
    #[error("no coverage for '{filename}' in either snapshot")]
    InternalConsistency { filename: String },

    /// The result set file does not exist.
    #[error("{} does not exist!", path.display())]
    NotFound { path: PathBuf },

    /// I/O error reading a result set.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed result set JSON.
    #[error("invalid result set: {0}")]
    Json(#[from] serde_json::Error),
}
