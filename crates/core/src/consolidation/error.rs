//! Consolidation error types.
//!
//! External-service failures during consolidation leave the box in
//! Consolidating on purpose: reverting to Open would re-admit expenses
//! against a settlement whose numbers were already computed once. The
//! operator retries `consolidate`, which resumes from the frozen state.

use thiserror::Error;

use caja_shared::BoxId;

/// Errors from the consolidation orchestrator.
#[derive(Debug, Error)]
pub enum ConsolidationError {
    /// The requested box does not exist.
    #[error("No active box: {0} not found")]
    NoActiveBox(BoxId),

    /// Another writer touched the box between our read and our write.
    /// Re-read the box state and retry; the attempt may resume.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// The document renderer failed; the box stays Consolidating.
    #[error("Settlement document generation failed: {0}")]
    DocumentGenerationFailed(String),

    /// The archive write failed; the box stays Consolidating.
    #[error("Settlement document archiving failed: {0}")]
    ArchivePersistFailed(String),

    /// Record store error.
    #[error("Record store error: {0}")]
    Store(String),

    /// Invariant breach in stored data (e.g. a Consolidated box without a
    /// document reference).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConsolidationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoActiveBox(_) => "NO_ACTIVE_BOX",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::DocumentGenerationFailed(_) => "DOCUMENT_GENERATION_FAILED",
            Self::ArchivePersistFailed(_) => "ARCHIVE_PERSIST_FAILED",
            Self::Store(_) => "STORE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NoActiveBox(_) => 404,
            Self::ConcurrentModification => 409,
            Self::DocumentGenerationFailed(_) | Self::ArchivePersistFailed(_) | Self::Store(_) => {
                502
            }
            Self::Internal(_) => 500,
        }
    }

    /// Returns true if the operation can be retried (possibly resuming a
    /// frozen box) after re-reading state.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrentModification
                | Self::DocumentGenerationFailed(_)
                | Self::ArchivePersistFailed(_)
                | Self::Store(_)
        )
    }
}

/// Errors from the document renderer collaborator.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The renderer rejected the snapshot.
    #[error("Renderer rejected the settlement snapshot: {0}")]
    Rejected(String),

    /// The renderer could not be reached or timed out.
    #[error("Renderer unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the settlement notifier collaborator. Logged, never escalated.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The notification could not be delivered.
    #[error("Notification failed: {0}")]
    Failed(String),
}
