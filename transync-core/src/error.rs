//! Error types for transync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a resource spec or resolving it against disk.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The resource spec JSON is malformed or is missing required keys.
    #[error("invalid resource spec at {path}: {message}")]
    SpecFormat { path: PathBuf, message: String },

    /// The directory backing a wildcard rule could not be listed.
    #[error("cannot list resource directory {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A wildcard candidate does not end with the rule's English marker.
    #[error("English marker '{marker}' is not a suffix of '{file}'")]
    MarkerNotSuffix { file: PathBuf, marker: String },

    /// Any other I/O failure, with the path it happened on.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by a [`TranslationService`](crate::service::TranslationService).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service answered with a non-success status.
    #[error("translation service returned HTTP {status} for {url}")]
    Http { status: u16, url: String },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("translation service request failed: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("cannot decode translation service response: {0}")]
    Decode(String),

    /// Reading an upload or writing a download failed locally.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SpecError {
    SpecError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn format_err(path: impl Into<PathBuf>, message: impl Into<String>) -> SpecError {
    SpecError::SpecFormat {
        path: path.into(),
        message: message.into(),
    }
}
