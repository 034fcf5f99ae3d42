//! Error types for message extraction and storage

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while decoding, sanitizing or loading messages.
///
/// The extraction pipeline never surfaces these to its caller; they are
/// produced by individual stages and turned into degraded output.
#[derive(Error, Debug)]
pub enum MailError {
    /// Failed to decode part content
    #[error("Failed to decode content: {0}")]
    Decode(String),

    /// Sanitizer policy is inconsistent or the sanitizer faulted
    #[error("Sanitizer failure: {0}")]
    Sanitize(String),

    /// I/O error with the associated path
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// No message stored under the identifier
    #[error("Message not found: {0}")]
    NotFound(String),

    /// Identifier cannot be mapped to a stored message safely
    #[error("Invalid message identifier: {0}")]
    InvalidId(String),

    /// Invalid store configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Failed to serialize output for a renderer
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl MailError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for mailview operations
pub type Result<T> = std::result::Result<T, MailError>;
