//! Box lifecycle service: opening fund periods and looking up the active box.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use caja_shared::BoxId;

use super::error::CashboxError;
use super::repo::{BoxRepository, RepoError};
use super::types::{BoxState, OpenBoxInput, PettyCashBox};

/// Service for opening fund periods.
///
/// Enforces the single-active-box rule: a new box can only be opened when
/// no box is Open or Consolidating.
pub struct CashboxService<B: BoxRepository> {
    boxes: Arc<B>,
}

impl<B: BoxRepository> CashboxService<B> {
    /// Create a new lifecycle service.
    #[must_use]
    pub fn new(boxes: Arc<B>) -> Self {
        Self { boxes }
    }

    /// Open a new fund period.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An Open or Consolidating box already exists
    /// - The initial amount is not positive
    /// - The custodian is blank
    /// - The record store fails
    pub async fn open_box(&self, input: OpenBoxInput) -> Result<PettyCashBox, CashboxError> {
        if input.custodian.trim().is_empty() {
            return Err(CashboxError::MissingCustodian);
        }

        if input.initial_amount <= Decimal::ZERO {
            return Err(CashboxError::NonPositiveAmount);
        }

        if let Some(active) = self.boxes.find_active().await.map_err(map_store)? {
            return Err(CashboxError::ActiveBoxExists {
                state: active.state,
            });
        }

        let cashbox = PettyCashBox {
            id: BoxId::new(),
            custodian: input.custodian,
            external_id: input.external_id,
            concept: input.concept,
            initial_amount: input.initial_amount,
            opened_at: Utc::now().date_naive(),
            state: BoxState::Open,
            consolidated_at: None,
            document_ref: None,
            version: 0,
        };

        self.boxes.create(cashbox).await.map_err(map_store)
    }

    /// The box currently occupying the active slot, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the record store fails.
    pub async fn current_box(&self) -> Result<Option<PettyCashBox>, CashboxError> {
        self.boxes.find_active().await.map_err(map_store)
    }
}

fn map_store(err: RepoError) -> CashboxError {
    CashboxError::Store(err.to_string())
}
