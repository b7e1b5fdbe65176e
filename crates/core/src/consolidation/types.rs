//! Consolidation domain types: the frozen snapshot and settlement totals.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::cashbox::{Expense, PettyCashBox};

/// Settlement totals for a fund period.
///
/// Exactly one of `balance_to_return` and `custodian_owes` is non-zero
/// (both are zero when the fund was consumed to the peso).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settlement {
    /// Sum of all recorded expense amounts.
    pub total_legalized: Decimal,
    /// Unspent funds the custodian returns to the organization.
    pub balance_to_return: Decimal,
    /// Overspend the custodian owes (deficit case).
    pub custodian_owes: Decimal,
}

impl Settlement {
    /// Compute settlement totals from the initial amount and the frozen
    /// expense set.
    #[must_use]
    pub fn compute(initial_amount: Decimal, expenses: &[Expense]) -> Self {
        let total_legalized: Decimal = expenses.iter().map(|e| e.amount).sum();
        let remainder = initial_amount - total_legalized;

        Self {
            total_legalized,
            balance_to_return: remainder.max(Decimal::ZERO),
            custodian_owes: (-remainder).max(Decimal::ZERO),
        }
    }
}

/// The frozen basis of one consolidation attempt: the box header, the
/// expense set as of the freeze, and the computed totals. Transient;
/// handed to the document renderer, never persisted on its own.
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidationSnapshot {
    /// The box being settled.
    pub cashbox: PettyCashBox,
    /// All expenses recorded against the box at freeze time.
    pub expenses: Vec<Expense>,
    /// Settlement totals derived from the expenses above.
    pub settlement: Settlement,
}

/// Result of a consolidation call.
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidationOutcome {
    /// The box after consolidation.
    pub cashbox: PettyCashBox,
    /// The settlement totals.
    pub settlement: Settlement,
    /// Archive reference of the settlement document.
    pub document_ref: String,
    /// True when the box was already Consolidated and the existing
    /// settlement was returned without a second archive write.
    pub already_consolidated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use caja_shared::{BoxId, ExpenseId};

    fn make_expense(amount: Decimal) -> Expense {
        Expense {
            id: ExpenseId::new(),
            box_id: BoxId::new(),
            date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            payee: "Payee".to_string(),
            external_id: "NIT-1".to_string(),
            concept: "Expense".to_string(),
            cost_center: None,
            amount,
            voucher_ref: None,
        }
    }

    #[test]
    fn test_settlement_exact_consumption() {
        let expenses = vec![make_expense(dec!(1_200_000)), make_expense(dec!(800_000))];
        let settlement = Settlement::compute(dec!(2_000_000), &expenses);

        assert_eq!(settlement.total_legalized, dec!(2_000_000));
        assert_eq!(settlement.balance_to_return, dec!(0));
        assert_eq!(settlement.custodian_owes, dec!(0));
    }

    #[test]
    fn test_settlement_with_remainder() {
        let expenses = vec![make_expense(dec!(1_500_000))];
        let settlement = Settlement::compute(dec!(2_000_000), &expenses);

        assert_eq!(settlement.total_legalized, dec!(1_500_000));
        assert_eq!(settlement.balance_to_return, dec!(500_000));
        assert_eq!(settlement.custodian_owes, dec!(0));
    }

    #[test]
    fn test_settlement_deficit() {
        let expenses = vec![make_expense(dec!(2_300_000))];
        let settlement = Settlement::compute(dec!(2_000_000), &expenses);

        assert_eq!(settlement.total_legalized, dec!(2_300_000));
        assert_eq!(settlement.balance_to_return, dec!(0));
        assert_eq!(settlement.custodian_owes, dec!(300_000));
    }

    #[test]
    fn test_settlement_no_expenses() {
        let settlement = Settlement::compute(dec!(500_000), &[]);
        assert_eq!(settlement.total_legalized, dec!(0));
        assert_eq!(settlement.balance_to_return, dec!(500_000));
        assert_eq!(settlement.custodian_owes, dec!(0));
    }
}
