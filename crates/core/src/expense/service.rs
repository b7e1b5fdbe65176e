//! Expense registration service.
//!
//! Registration is a load-validate-append sequence against the external
//! record store. The sequence is not atomic, so before appending, the
//! service claims its write slot with a version-only conditional update on
//! the box record. Whoever loses that write (a concurrent registration, or
//! the consolidation freeze) observes a version mismatch and must retry
//! from a fresh read.

use std::sync::Arc;

use rust_decimal::Decimal;

use caja_shared::{BoxId, ExpenseId};

use crate::cashbox::{
    BalanceEngine, BoxPatch, BoxRepository, BoxState, Expense, ExpenseRepository, NewExpenseInput,
    RepoError,
};

use super::error::ExpenseError;

/// Service for registering expenses against the currently open box.
pub struct ExpenseService<B: BoxRepository, E: ExpenseRepository> {
    boxes: Arc<B>,
    expenses: Arc<E>,
    hard_cap: Decimal,
}

impl<B: BoxRepository, E: ExpenseRepository> ExpenseService<B, E> {
    /// Create a new expense service with the configured hard cap.
    #[must_use]
    pub fn new(boxes: Arc<B>, expenses: Arc<E>, hard_cap: Decimal) -> Self {
        Self {
            boxes,
            expenses,
            hard_cap,
        }
    }

    /// Register a new expense against the currently open box.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No box is open (`NoOpenBox`), or the active box is frozen (`BoxFrozen`)
    /// - The balance engine rejects the amount
    /// - The box version moved between read and write (`ConcurrentModification`)
    /// - The record store fails
    pub async fn register(&self, input: NewExpenseInput) -> Result<Expense, ExpenseError> {
        let cashbox = self
            .boxes
            .find_active()
            .await
            .map_err(map_store)?
            .ok_or(ExpenseError::NoOpenBox)?;

        if cashbox.state == BoxState::Consolidating {
            return Err(ExpenseError::BoxFrozen);
        }

        let existing = self
            .expenses
            .list_by_box(cashbox.id)
            .await
            .map_err(map_store)?;

        BalanceEngine::validate_new_expense(&cashbox, &existing, input.amount, self.hard_cap)?;

        // Claim the write slot before appending. A concurrent registration or
        // the consolidation freeze invalidates the version we read, and the
        // expense must not land against a box we validated under stale state.
        self.boxes
            .update_if_version(cashbox.id, cashbox.version, BoxPatch::touch())
            .await
            .map_err(map_store)?;

        let expense = Expense {
            id: ExpenseId::new(),
            box_id: cashbox.id,
            date: input.date,
            payee: input.payee,
            external_id: input.external_id,
            concept: input.concept,
            cost_center: input.cost_center,
            amount: input.amount,
            voucher_ref: input.voucher_ref,
        };

        self.expenses.create(expense).await.map_err(map_store)
    }

    /// All expenses recorded against a box.
    ///
    /// # Errors
    ///
    /// Returns an error if the record store fails.
    pub async fn list_for_box(&self, box_id: BoxId) -> Result<Vec<Expense>, ExpenseError> {
        self.expenses.list_by_box(box_id).await.map_err(map_store)
    }
}

fn map_store(err: RepoError) -> ExpenseError {
    match err {
        RepoError::VersionMismatch { .. } => ExpenseError::ConcurrentModification,
        other => ExpenseError::Store(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::cashbox::{BalanceError, PettyCashBox};

    struct MockBoxRepository {
        boxes: Mutex<HashMap<BoxId, PettyCashBox>>,
    }

    impl MockBoxRepository {
        fn with_box(cashbox: PettyCashBox) -> Self {
            let mut map = HashMap::new();
            map.insert(cashbox.id, cashbox);
            Self {
                boxes: Mutex::new(map),
            }
        }

        fn empty() -> Self {
            Self {
                boxes: Mutex::new(HashMap::new()),
            }
        }
    }

    impl BoxRepository for MockBoxRepository {
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

    struct MockExpenseRepository {
        expenses: Mutex<Vec<Expense>>,
    }

    impl MockExpenseRepository {
        fn new() -> Self {
            Self {
                expenses: Mutex::new(Vec::new()),
            }
        }
    }

    impl ExpenseRepository for MockExpenseRepository {
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

    fn make_box(initial: Decimal, state: BoxState) -> PettyCashBox {
        PettyCashBox {
            id: BoxId::new(),
            custodian: "Maria Lopez".to_string(),
            external_id: "CC-1019283".to_string(),
            concept: "Office petty cash".to_string(),
            initial_amount: initial,
            opened_at: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            state,
            consolidated_at: None,
            document_ref: None,
            version: 0,
        }
    }

    fn expense_input(amount: Decimal) -> NewExpenseInput {
        NewExpenseInput {
            date: NaiveDate::from_ymd_opt(2026, 3, 12).unwrap(),
            payee: "Courier SA".to_string(),
            external_id: "NIT-900123".to_string(),
            concept: "Shipping".to_string(),
            cost_center: Some("LOG".to_string()),
            amount,
            voucher_ref: None,
        }
    }

    fn service(
        boxes: Arc<MockBoxRepository>,
        expenses: Arc<MockExpenseRepository>,
    ) -> ExpenseService<MockBoxRepository, MockExpenseRepository> {
        ExpenseService::new(boxes, expenses, dec!(2_000_000))
    }

    #[tokio::test]
    async fn test_register_appends_expense() {
        let cashbox = make_box(dec!(2_000_000), BoxState::Open);
        let box_id = cashbox.id;
        let boxes = Arc::new(MockBoxRepository::with_box(cashbox));
        let expenses = Arc::new(MockExpenseRepository::new());
        let svc = service(Arc::clone(&boxes), Arc::clone(&expenses));

        let expense = svc.register(expense_input(dec!(1_400_000))).await.unwrap();
        assert_eq!(expense.box_id, box_id);
        assert_eq!(expense.amount, dec!(1_400_000));

        let listed = svc.list_for_box(box_id).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_register_bumps_box_version() {
        let cashbox = make_box(dec!(2_000_000), BoxState::Open);
        let box_id = cashbox.id;
        let boxes = Arc::new(MockBoxRepository::with_box(cashbox));
        let expenses = Arc::new(MockExpenseRepository::new());
        let svc = service(Arc::clone(&boxes), expenses);

        svc.register(expense_input(dec!(100_000))).await.unwrap();
        let stored = boxes.find_by_id(box_id).await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        // Only the version moved; the box itself is untouched.
        assert_eq!(stored.state, BoxState::Open);
        assert!(stored.document_ref.is_none());
    }

    #[tokio::test]
    async fn test_register_without_open_box() {
        let boxes = Arc::new(MockBoxRepository::empty());
        let expenses = Arc::new(MockExpenseRepository::new());
        let svc = service(boxes, expenses);

        let result = svc.register(expense_input(dec!(100))).await;
        assert!(matches!(result, Err(ExpenseError::NoOpenBox)));
    }

    #[tokio::test]
    async fn test_register_against_frozen_box() {
        let cashbox = make_box(dec!(2_000_000), BoxState::Consolidating);
        let boxes = Arc::new(MockBoxRepository::with_box(cashbox));
        let expenses = Arc::new(MockExpenseRepository::new());
        let svc = service(boxes, expenses);

        let result = svc.register(expense_input(dec!(100))).await;
        assert!(matches!(result, Err(ExpenseError::BoxFrozen)));
    }

    #[tokio::test]
    async fn test_register_insufficient_balance() {
        let cashbox = make_box(dec!(2_000_000), BoxState::Open);
        let boxes = Arc::new(MockBoxRepository::with_box(cashbox));
        let expenses = Arc::new(MockExpenseRepository::new());
        let svc = service(boxes, expenses);

        svc.register(expense_input(dec!(1_400_000))).await.unwrap();
        let result = svc.register(expense_input(dec!(700_000))).await;
        assert!(matches!(
            result,
            Err(ExpenseError::Balance(
                BalanceError::InsufficientBalance { .. }
            ))
        ));

        // Consuming the exact remainder is fine.
        let expense = svc.register(expense_input(dec!(600_000))).await.unwrap();
        assert_eq!(expense.amount, dec!(600_000));
    }

    #[tokio::test]
    async fn test_register_deficit_blocks_everything() {
        let cashbox = make_box(dec!(100_000), BoxState::Open);
        let box_id = cashbox.id;
        let boxes = Arc::new(MockBoxRepository::with_box(cashbox));
        let expenses = Arc::new(MockExpenseRepository::new());

        // Seed a historical overdraw directly, bypassing validation.
        expenses
            .create(Expense {
                id: ExpenseId::new(),
                box_id,
                date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                payee: "Legacy".to_string(),
                external_id: "NIT-0".to_string(),
                concept: "Imported".to_string(),
                cost_center: None,
                amount: dec!(150_000),
                voucher_ref: None,
            })
            .await
            .unwrap();

        let svc = service(boxes, expenses);
        let result = svc.register(expense_input(dec!(1))).await;
        assert!(matches!(
            result,
            Err(ExpenseError::Balance(BalanceError::AlreadyInDeficit { .. }))
        ));
    }

    /// Repository whose conditional write loses exactly once, as if another
    /// writer slipped in between our read and our write.
    struct ContendedBoxRepository {
        inner: MockBoxRepository,
        lose_next_write: std::sync::atomic::AtomicBool,
    }

    impl ContendedBoxRepository {
        fn with_box(cashbox: PettyCashBox) -> Self {
            Self {
                inner: MockBoxRepository::with_box(cashbox),
                lose_next_write: std::sync::atomic::AtomicBool::new(true),
            }
        }
    }

    impl BoxRepository for ContendedBoxRepository {
        async fn find_by_id(&self, id: BoxId) -> Result<Option<PettyCashBox>, RepoError> {
            self.inner.find_by_id(id).await
        }

        async fn find_active(&self) -> Result<Option<PettyCashBox>, RepoError> {
            self.inner.find_active().await
        }

        async fn create(&self, cashbox: PettyCashBox) -> Result<PettyCashBox, RepoError> {
            self.inner.create(cashbox).await
        }

        async fn update_if_version(
            &self,
            id: BoxId,
            expected_version: i64,
            patch: BoxPatch,
        ) -> Result<PettyCashBox, RepoError> {
            if self
                .lose_next_write
                .swap(false, std::sync::atomic::Ordering::SeqCst)
            {
                return Err(RepoError::VersionMismatch {
                    id,
                    expected: expected_version,
                });
            }
            self.inner.update_if_version(id, expected_version, patch).await
        }
    }

    #[tokio::test]
    async fn test_register_loses_version_race() {
        let cashbox = make_box(dec!(2_000_000), BoxState::Open);
        let boxes = Arc::new(ContendedBoxRepository::with_box(cashbox));
        let expenses = Arc::new(MockExpenseRepository::new());
        let svc = ExpenseService::new(Arc::clone(&boxes), Arc::clone(&expenses), dec!(2_000_000));

        let result = svc.register(expense_input(dec!(100))).await;
        assert!(matches!(result, Err(ExpenseError::ConcurrentModification)));
        // The losing writer appended nothing.
        assert!(expenses.expenses.lock().unwrap().is_empty());

        // Retrying after a fresh read succeeds.
        let expense = svc.register(expense_input(dec!(100))).await.unwrap();
        assert_eq!(expense.amount, dec!(100));
    }

    #[tokio::test]
    async fn test_concurrent_registrations_second_writer_fails() {
        let cashbox = make_box(dec!(600_000), BoxState::Open);
        let box_id = cashbox.id;
        let boxes = Arc::new(MockBoxRepository::with_box(cashbox));
        let expenses = Arc::new(MockExpenseRepository::new());
        let svc = service(Arc::clone(&boxes), Arc::clone(&expenses));

        // Writer A reads version 0 and completes.
        svc.register(expense_input(dec!(600_000))).await.unwrap();

        // Writer B simulates having read version 0 concurrently: its
        // conditional touch must lose.
        let result = boxes.update_if_version(box_id, 0, BoxPatch::touch()).await;
        assert!(matches!(result, Err(RepoError::VersionMismatch { .. })));

        // Re-reading and reapplying, writer B now fails validation instead:
        // the balance is exhausted.
        let result = svc.register(expense_input(dec!(600_000))).await;
        assert!(matches!(
            result,
            Err(ExpenseError::Balance(
                BalanceError::InsufficientBalance { .. }
            ))
        ));
    }
}
