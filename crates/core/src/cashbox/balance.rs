//! Balance engine: pure arithmetic over a box and its recorded expenses.
//!
//! Every function is side-effect free and fully determined by its inputs,
//! so admission decisions are deterministic and testable in isolation.

use rust_decimal::Decimal;
use serde::Serialize;

use super::error::BalanceError;
use super::types::{BoxState, Expense, PettyCashBox};

/// Consumption summary for a box, derived from its recorded expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceSummary {
    /// The amount the fund was opened with.
    pub initial_amount: Decimal,
    /// Sum of all recorded expense amounts.
    pub spent: Decimal,
    /// Remaining balance; negative when the box is in deficit.
    pub available: Decimal,
    /// Percentage of the fund consumed, rounded to 2 decimal places.
    pub utilization_percent: Decimal,
}

impl BalanceSummary {
    /// Returns true if recorded expenses exceed the initial amount.
    #[must_use]
    pub fn is_deficit(&self) -> bool {
        self.available < Decimal::ZERO
    }
}

/// Stateless engine for balance arithmetic and expense admission.
pub struct BalanceEngine;

impl BalanceEngine {
    /// Remaining balance of the box: `initial_amount - sum(expenses)`.
    ///
    /// May be negative if historical data already put the box in deficit.
    #[must_use]
    pub fn available_balance(cashbox: &PettyCashBox, expenses: &[Expense]) -> Decimal {
        cashbox.initial_amount - Self::total_spent(expenses)
    }

    /// Sum of all recorded expense amounts.
    #[must_use]
    pub fn total_spent(expenses: &[Expense]) -> Decimal {
        expenses.iter().map(|e| e.amount).sum()
    }

    /// Derive the consumption summary for a box.
    #[must_use]
    pub fn consumption(cashbox: &PettyCashBox, expenses: &[Expense]) -> BalanceSummary {
        let spent = Self::total_spent(expenses);
        let available = cashbox.initial_amount - spent;

        let utilization_percent = if cashbox.initial_amount.is_zero() {
            Decimal::ZERO
        } else {
            (spent / cashbox.initial_amount * Decimal::ONE_HUNDRED).round_dp(2)
        };

        BalanceSummary {
            initial_amount: cashbox.initial_amount,
            spent,
            available,
            utilization_percent,
        }
    }

    /// Validate whether a candidate expense is admissible against the box.
    ///
    /// Checks are applied in a fixed order:
    /// 1. The box must be Open.
    /// 2. The amount must be positive.
    /// 3. The amount must not exceed the absolute hard cap.
    /// 4. The box must not already be in deficit.
    /// 5. The amount must not exceed the available balance.
    ///
    /// # Errors
    ///
    /// Returns the first failing `BalanceError` in the order above.
    pub fn validate_new_expense(
        cashbox: &PettyCashBox,
        expenses: &[Expense],
        candidate: Decimal,
        hard_cap: Decimal,
    ) -> Result<(), BalanceError> {
        if cashbox.state != BoxState::Open {
            return Err(BalanceError::NotOpen {
                state: cashbox.state,
            });
        }

        if candidate <= Decimal::ZERO {
            return Err(BalanceError::NonPositiveAmount);
        }

        if candidate > hard_cap {
            return Err(BalanceError::ExceedsHardCap {
                amount: candidate,
                cap: hard_cap,
            });
        }

        let available = Self::available_balance(cashbox, expenses);
        if available < Decimal::ZERO {
            return Err(BalanceError::AlreadyInDeficit { balance: available });
        }

        if candidate > available {
            return Err(BalanceError::InsufficientBalance {
                requested: candidate,
                available,
            });
        }

        Ok(())
    }
}
