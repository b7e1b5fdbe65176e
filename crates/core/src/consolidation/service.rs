//! Consolidation orchestrator.
//!
//! Drives a box through Open → Consolidating → Consolidated:
//!
//! 1. Load the box (idempotent return if already Consolidated).
//! 2. Freeze: conditional write moving the box to Consolidating. From this
//!    point expense registration rejects the box.
//! 3. Snapshot the expense set and compute settlement totals.
//! 4. Render the settlement document.
//! 5. Archive the document under the deterministic period key.
//! 6. Commit: conditional write moving the box to Consolidated with the
//!    archive reference. The single authoritative commit point.
//! 7. Best-effort notification of the settlement.
//!
//! A failure in steps 4 or 5 leaves the box Consolidating; calling
//! `consolidate` again resumes from the frozen state with the same expense
//! set, never restarting from Open.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use caja_shared::BoxId;

use crate::archive::{ArchiveError, ArchiveService};
use crate::cashbox::{BoxPatch, BoxRepository, BoxState, ExpenseRepository, PettyCashBox, RepoError};

use super::error::{ConsolidationError, NotifyError, RenderError};
use super::types::{ConsolidationOutcome, ConsolidationSnapshot, Settlement};

/// Document renderer collaborator: turns a settlement snapshot into
/// document bytes.
pub trait SettlementRenderer: Send + Sync {
    /// Render the snapshot into a document.
    fn render(
        &self,
        snapshot: &ConsolidationSnapshot,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, RenderError>> + Send;
}

/// Archive collaborator: durable storage for settlement documents.
///
/// Implemented by [`ArchiveService`]; abstracted so the orchestrator can be
/// tested without an object store.
pub trait DocumentArchive: Send + Sync {
    /// Write document bytes under a key, returning the archive reference.
    fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
    ) -> impl std::future::Future<Output = Result<String, ArchiveError>> + Send;

    /// Check if a document exists under a key.
    fn exists(&self, key: &str) -> impl std::future::Future<Output = bool> + Send;
}

impl DocumentArchive for ArchiveService {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, ArchiveError> {
        Self::put(self, key, bytes).await
    }

    async fn exists(&self, key: &str) -> bool {
        Self::exists(self, key).await
    }
}

/// Notifier collaborator: reports the settlement to operators.
/// Failures are logged, never escalated.
pub trait SettlementNotifier: Send + Sync {
    /// Send the settlement summary.
    fn send(
        &self,
        cashbox: &PettyCashBox,
        settlement: &Settlement,
        document_ref: &str,
    ) -> impl std::future::Future<Output = Result<(), NotifyError>> + Send;
}

/// Orchestrator for closing out a fund period.
pub struct ConsolidationService<B, E, R, A, N>
where
    B: BoxRepository,
    E: ExpenseRepository,
    R: SettlementRenderer,
    A: DocumentArchive,
    N: SettlementNotifier,
{
    boxes: Arc<B>,
    expenses: Arc<E>,
    renderer: Arc<R>,
    archive: Arc<A>,
    notifier: Arc<N>,
    notify_timeout: Duration,
}

impl<B, E, R, A, N> ConsolidationService<B, E, R, A, N>
where
    B: BoxRepository,
    E: ExpenseRepository,
    R: SettlementRenderer,
    A: DocumentArchive,
    N: SettlementNotifier,
{
    /// Create a new consolidation service.
    #[must_use]
    pub fn new(
        boxes: Arc<B>,
        expenses: Arc<E>,
        renderer: Arc<R>,
        archive: Arc<A>,
        notifier: Arc<N>,
        notify_timeout: Duration,
    ) -> Self {
        Self {
            boxes,
            expenses,
            renderer,
            archive,
            notifier,
            notify_timeout,
        }
    }

    /// Consolidate a box, or resume a previously interrupted attempt.
    ///
    /// Calling this on an already-Consolidated box is a no-op returning the
    /// existing settlement reference, so a retried request after a dropped
    /// response cannot double-archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the box does not exist, the freeze or commit
    /// write loses a version race, or the renderer/archive/record store
    /// fails. External-service failures leave the box Consolidating and are
    /// retryable.
    pub async fn consolidate(
        &self,
        box_id: BoxId,
    ) -> Result<ConsolidationOutcome, ConsolidationError> {
        let cashbox = self
            .boxes
            .find_by_id(box_id)
            .await
            .map_err(map_store)?
            .ok_or(ConsolidationError::NoActiveBox(box_id))?;

        match cashbox.state {
            BoxState::Consolidated => {
                let document_ref = cashbox.document_ref.clone().ok_or_else(|| {
                    ConsolidationError::Internal(format!(
                        "consolidated box {box_id} has no document reference"
                    ))
                })?;

                let expenses = self
                    .expenses
                    .list_by_box(cashbox.id)
                    .await
                    .map_err(map_store)?;
                let settlement = Settlement::compute(cashbox.initial_amount, &expenses);

                info!(box_id = %box_id, document_ref = %document_ref,
                    "Box already consolidated; returning existing settlement");

                Ok(ConsolidationOutcome {
                    cashbox,
                    settlement,
                    document_ref,
                    already_consolidated: true,
                })
            }
            BoxState::Open => {
                let frozen = self
                    .boxes
                    .update_if_version(cashbox.id, cashbox.version, BoxPatch::freeze())
                    .await
                    .map_err(map_store)?;

                info!(box_id = %box_id, "Box frozen for consolidation");
                self.settle(frozen).await
            }
            BoxState::Consolidating => {
                info!(box_id = %box_id, "Resuming interrupted consolidation");
                self.settle(cashbox).await
            }
        }
    }

    /// Steps 3-7: snapshot, render, archive, commit, notify.
    ///
    /// The box is already Consolidating here, so the expense set cannot
    /// change underneath us: re-running after a partial failure produces the
    /// same totals.
    async fn settle(
        &self,
        cashbox: PettyCashBox,
    ) -> Result<ConsolidationOutcome, ConsolidationError> {
        let expenses = self
            .expenses
            .list_by_box(cashbox.id)
            .await
            .map_err(map_store)?;
        let settlement = Settlement::compute(cashbox.initial_amount, &expenses);

        let snapshot = ConsolidationSnapshot {
            cashbox: cashbox.clone(),
            expenses,
            settlement,
        };

        let bytes = self
            .renderer
            .render(&snapshot)
            .await
            .map_err(|e| ConsolidationError::DocumentGenerationFailed(e.to_string()))?;

        let key = ArchiveService::period_key(cashbox.opened_at);
        if self.archive.exists(&key).await {
            // A previous attempt's upload landed despite a timed-out
            // response; the deterministic key lets us overwrite it.
            info!(box_id = %cashbox.id, key = %key, "Overwriting document from prior attempt");
        }

        let document_ref = self
            .archive
            .put(&key, bytes)
            .await
            .map_err(|e| ConsolidationError::ArchivePersistFailed(e.to_string()))?;

        let committed = self
            .boxes
            .update_if_version(
                cashbox.id,
                cashbox.version,
                BoxPatch::commit(Utc::now().date_naive(), document_ref.clone()),
            )
            .await
            .map_err(map_store)?;

        info!(
            box_id = %committed.id,
            total_legalized = %settlement.total_legalized,
            balance_to_return = %settlement.balance_to_return,
            custodian_owes = %settlement.custodian_owes,
            document_ref = %document_ref,
            "Box consolidated"
        );

        self.notify(&committed, &settlement, &document_ref).await;

        Ok(ConsolidationOutcome {
            cashbox: committed,
            settlement,
            document_ref,
            already_consolidated: false,
        })
    }

    /// Best-effort settlement notification with a short timeout.
    async fn notify(&self, cashbox: &PettyCashBox, settlement: &Settlement, document_ref: &str) {
        let send = self.notifier.send(cashbox, settlement, document_ref);
        match tokio::time::timeout(self.notify_timeout, send).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(box_id = %cashbox.id, error = %e, "Settlement notification failed");
            }
            Err(_) => {
                warn!(box_id = %cashbox.id, "Settlement notification timed out");
            }
        }
    }
}

fn map_store(err: RepoError) -> ConsolidationError {
    match err {
        RepoError::VersionMismatch { .. } => ConsolidationError::ConcurrentModification,
        other => ConsolidationError::Store(other.to_string()),
    }
}
