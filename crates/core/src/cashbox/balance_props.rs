//! Property-based tests for expense admission and settlement arithmetic.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use caja_shared::{BoxId, ExpenseId};

use super::balance::BalanceEngine;
use super::error::BalanceError;
use super::types::{BoxState, Expense, PettyCashBox};

/// Strategy to generate a positive peso amount (whole pesos up to 10M).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|pesos| Decimal::new(pesos, 0))
}

/// Strategy to generate a list of expense amounts.
fn amount_list() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(positive_amount(), 0..20)
}

fn make_box(initial: Decimal) -> PettyCashBox {
    PettyCashBox {
        id: BoxId::new(),
        custodian: "Custodian".to_string(),
        external_id: "CC-1".to_string(),
        concept: "Fund".to_string(),
        initial_amount: initial,
        opened_at: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        state: BoxState::Open,
        consolidated_at: None,
        document_ref: None,
        version: 0,
    }
}

fn make_expenses(box_id: BoxId, amounts: &[Decimal]) -> Vec<Expense> {
    amounts
        .iter()
        .map(|&amount| Expense {
            id: ExpenseId::new(),
            box_id,
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            payee: "Payee".to_string(),
            external_id: "NIT-1".to_string(),
            concept: "Expense".to_string(),
            cost_center: None,
            amount,
            voucher_ref: None,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Accepted expenses never push a non-deficit box past its initial amount:
    /// whenever validation admits a candidate, spent + candidate <= initial.
    #[test]
    fn prop_accepted_expense_never_exceeds_initial_amount(
        initial in positive_amount(),
        amounts in amount_list(),
        candidate in positive_amount(),
    ) {
        let cashbox = make_box(initial);
        let expenses = make_expenses(cashbox.id, &amounts);
        let spent = BalanceEngine::total_spent(&expenses);

        // Hard cap out of the way; this property targets balance admission.
        let cap = initial + candidate;

        if BalanceEngine::validate_new_expense(&cashbox, &expenses, candidate, cap).is_ok() {
            prop_assert!(spent + candidate <= cashbox.initial_amount);
        }
    }

    /// A box in deficit admits nothing, no matter how small the candidate.
    #[test]
    fn prop_deficit_blocks_all_candidates(
        initial in positive_amount(),
        overdraw in positive_amount(),
        candidate in positive_amount(),
    ) {
        let cashbox = make_box(initial);
        let expenses = make_expenses(cashbox.id, &[initial + overdraw]);

        let result = BalanceEngine::validate_new_expense(
            &cashbox,
            &expenses,
            candidate,
            initial + overdraw + candidate,
        );
        prop_assert!(
            matches!(result, Err(BalanceError::AlreadyInDeficit { .. })),
            "expected AlreadyInDeficit"
        );
    }

    /// Non-positive candidates are always rejected before any balance check.
    #[test]
    fn prop_non_positive_always_rejected(
        initial in positive_amount(),
        amounts in amount_list(),
        non_positive in -10_000_000i64..=0i64,
    ) {
        let cashbox = make_box(initial);
        let expenses = make_expenses(cashbox.id, &amounts);

        let result = BalanceEngine::validate_new_expense(
            &cashbox,
            &expenses,
            Decimal::new(non_positive, 0),
            initial,
        );
        prop_assert!(matches!(result, Err(BalanceError::NonPositiveAmount)));
    }

    /// available_balance is exactly initial minus the expense sum,
    /// regardless of how the amounts are distributed.
    #[test]
    fn prop_available_balance_matches_sum(
        initial in positive_amount(),
        amounts in amount_list(),
    ) {
        let cashbox = make_box(initial);
        let expenses = make_expenses(cashbox.id, &amounts);
        let spent: Decimal = amounts.iter().copied().sum();

        prop_assert_eq!(
            BalanceEngine::available_balance(&cashbox, &expenses),
            initial - spent
        );
    }
}
