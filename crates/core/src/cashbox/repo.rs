//! Repository traits for box and expense persistence.
//!
//! These traits are implemented by the store crate against the external
//! record store, and by in-memory fakes in tests. The box record is the
//! only piece of mutable shared state; writers serialize on its version
//! through `update_if_version`.

use thiserror::Error;

use caja_shared::BoxId;
use chrono::NaiveDate;

use super::types::{BoxState, Expense, PettyCashBox};

/// Errors from record-store operations.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Conditional write lost: the record's version moved underneath us.
    #[error("Version mismatch on box {id}: expected {expected}")]
    VersionMismatch {
        /// The box whose write was rejected.
        id: BoxId,
        /// The version the writer expected.
        expected: i64,
    },

    /// The record does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The store returned a payload we could not interpret.
    #[error("Malformed record: {0}")]
    Malformed(String),

    /// The store could not be reached or timed out.
    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

/// Partial update applied to a box record by a conditional write.
///
/// Unset fields are left untouched. Every applied patch bumps the record's
/// version, including the empty `touch` patch used by expense registration
/// to claim its write slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoxPatch {
    /// New lifecycle state.
    pub state: Option<BoxState>,
    /// Consolidation date.
    pub consolidated_at: Option<NaiveDate>,
    /// Archive reference of the settlement document.
    pub document_ref: Option<String>,
}

impl BoxPatch {
    /// A version-only bump with no field changes.
    #[must_use]
    pub fn touch() -> Self {
        Self::default()
    }

    /// The freeze write: Open → Consolidating.
    #[must_use]
    pub fn freeze() -> Self {
        Self {
            state: Some(BoxState::Consolidating),
            ..Self::default()
        }
    }

    /// The commit write: Consolidating → Consolidated with settlement metadata.
    #[must_use]
    pub fn commit(consolidated_at: NaiveDate, document_ref: String) -> Self {
        Self {
            state: Some(BoxState::Consolidated),
            consolidated_at: Some(consolidated_at),
            document_ref: Some(document_ref),
        }
    }
}

/// Repository for petty-cash box records.
pub trait BoxRepository: Send + Sync {
    /// Find a box by id.
    fn find_by_id(
        &self,
        id: BoxId,
    ) -> impl std::future::Future<Output = Result<Option<PettyCashBox>, RepoError>> + Send;

    /// Find the box occupying the active slot (Open or Consolidating), if any.
    fn find_active(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<PettyCashBox>, RepoError>> + Send;

    /// Create a new box record.
    fn create(
        &self,
        cashbox: PettyCashBox,
    ) -> impl std::future::Future<Output = Result<PettyCashBox, RepoError>> + Send;

    /// Apply a patch to the box record, conditional on its current version.
    ///
    /// Returns the updated record with its bumped version, or
    /// `RepoError::VersionMismatch` if another writer got there first.
    fn update_if_version(
        &self,
        id: BoxId,
        expected_version: i64,
        patch: BoxPatch,
    ) -> impl std::future::Future<Output = Result<PettyCashBox, RepoError>> + Send;
}

/// Repository for expense records. Append-only.
pub trait ExpenseRepository: Send + Sync {
    /// Persist a new expense record.
    fn create(
        &self,
        expense: Expense,
    ) -> impl std::future::Future<Output = Result<Expense, RepoError>> + Send;

    /// All expenses recorded against a box.
    fn list_by_box(
        &self,
        box_id: BoxId,
    ) -> impl std::future::Future<Output = Result<Vec<Expense>, RepoError>> + Send;
}
