//! Archive error types.

use thiserror::Error;

/// Archive operation errors.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Object not found in the archive.
    #[error("document not found: {key}")]
    NotFound {
        /// Archive key that was not found.
        key: String,
    },

    /// Archive provider configuration error.
    #[error("archive configuration error: {0}")]
    Configuration(String),

    /// OpenDAL operation error.
    #[error("archive operation failed: {0}")]
    Operation(String),
}

impl ArchiveError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }
}

impl From<opendal::Error> for ArchiveError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: err.to_string(),
            },
            _ => Self::Operation(err.to_string()),
        }
    }
}
