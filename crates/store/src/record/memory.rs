//! In-memory record store.
//!
//! Implements the same conditional-write semantics as the real record
//! store. Used by the development profile and by integration-style tests
//! that need a full stack without network collaborators.

use std::collections::HashMap;
use std::sync::Mutex;

use caja_core::cashbox::{
    BoxPatch, BoxRepository, Expense, ExpenseRepository, PettyCashBox, RepoError,
};
use caja_shared::BoxId;

/// In-process record store with versioned boxes and append-only expenses.
#[derive(Default)]
pub struct MemoryRecordStore {
    boxes: Mutex<HashMap<BoxId, PettyCashBox>>,
    expenses: Mutex<Vec<Expense>>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BoxRepository for MemoryRecordStore {
    async fn find_by_id(&self, id: BoxId) -> Result<Option<PettyCashBox>, RepoError> {
        Ok(self.boxes.lock().unwrap().get(&id).cloned())
    }

    async fn find_active(&self) -> Result<Option<PettyCashBox>, RepoError> {
        Ok(self
            .boxes
            .lock()
            .unwrap()
            .values()
            .find(|b| b.state.is_active())
            .cloned())
    }

    async fn create(&self, cashbox: PettyCashBox) -> Result<PettyCashBox, RepoError> {
        self.boxes
            .lock()
            .unwrap()
            .insert(cashbox.id, cashbox.clone());
        Ok(cashbox)
    }

    async fn update_if_version(
        &self,
        id: BoxId,
        expected_version: i64,
        patch: BoxPatch,
    ) -> Result<PettyCashBox, RepoError> {
        let mut boxes = self.boxes.lock().unwrap();
        let cashbox = boxes
            .get_mut(&id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;

        if cashbox.version != expected_version {
            return Err(RepoError::VersionMismatch {
                id,
                expected: expected_version,
            });
        }

        if let Some(state) = patch.state {
            cashbox.state = state;
        }
        if let Some(date) = patch.consolidated_at {
            cashbox.consolidated_at = Some(date);
        }
        if let Some(doc) = patch.document_ref {
            cashbox.document_ref = Some(doc);
        }
        cashbox.version += 1;

        Ok(cashbox.clone())
    }
}

impl ExpenseRepository for MemoryRecordStore {
    async fn create(&self, expense: Expense) -> Result<Expense, RepoError> {
        self.expenses.lock().unwrap().push(expense.clone());
        Ok(expense)
    }

    async fn list_by_box(&self, box_id: BoxId) -> Result<Vec<Expense>, RepoError> {
        Ok(self
            .expenses
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.box_id == box_id)
            .cloned()
            .collect())
    }
}
