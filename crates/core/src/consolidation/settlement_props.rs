//! Property-based tests for settlement arithmetic.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use caja_shared::{BoxId, ExpenseId};

use crate::cashbox::Expense;

use super::types::Settlement;

fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|pesos| Decimal::new(pesos, 0))
}

fn amount_list() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(positive_amount(), 0..30)
}

fn make_expenses(amounts: &[Decimal]) -> Vec<Expense> {
    let box_id = BoxId::new();
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

    /// The settlement identity holds for any expense set:
    /// balance_to_return - custodian_owes == initial - total_legalized,
    /// and at most one of the two sides is non-zero.
    #[test]
    fn prop_settlement_identity(
        initial in positive_amount(),
        amounts in amount_list(),
    ) {
        let expenses = make_expenses(&amounts);
        let settlement = Settlement::compute(initial, &expenses);

        prop_assert_eq!(
            settlement.balance_to_return - settlement.custodian_owes,
            initial - settlement.total_legalized
        );
        prop_assert!(
            settlement.balance_to_return.is_zero() || settlement.custodian_owes.is_zero()
        );
        prop_assert!(settlement.balance_to_return >= Decimal::ZERO);
        prop_assert!(settlement.custodian_owes >= Decimal::ZERO);
    }

    /// total_legalized is exactly the expense sum, independent of ordering.
    #[test]
    fn prop_total_legalized_is_sum(
        initial in positive_amount(),
        amounts in amount_list(),
    ) {
        let mut expenses = make_expenses(&amounts);
        let forward = Settlement::compute(initial, &expenses);
        expenses.reverse();
        let backward = Settlement::compute(initial, &expenses);

        let sum: Decimal = amounts.iter().copied().sum();
        prop_assert_eq!(forward.total_legalized, sum);
        prop_assert_eq!(forward, backward);
    }
}
