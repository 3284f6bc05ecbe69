//! Error types for transync-sync.

use std::path::PathBuf;

use thiserror::Error;

use transync_core::{ServiceError, SpecError};

/// All errors that can arise from push, pull and snapshot operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The resource spec could not be loaded or resolved.
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// A translation-service call failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A resolved resource file is not on disk, so it cannot be hashed.
    #[error("file does not exist: {path}")]
    FileMissing { path: PathBuf },

    /// No upload format is registered for the file's extension.
    #[error("unrecognised extension in filename: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// The remote project slug is unknown to the service.
    #[error("project does not exist: '{slug}'")]
    ProjectNotFound { slug: String },

    /// A downloaded file has no statistics entry.
    #[error("no stats for {file}")]
    StatsMissing { file: String },

    /// Invalid combination of options.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (snapshot write).
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
