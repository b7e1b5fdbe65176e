//! Petty-cash domain types.
//!
//! A `PettyCashBox` is one funded period under a custodian. Expenses are
//! drawn against the open box until it is consolidated into a settlement
//! document. The valid state transitions are:
//! - Open → Consolidating (freeze)
//! - Consolidating → Consolidated (commit)
//!
//! Transitions never reverse.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use caja_shared::{BoxId, ExpenseId};

/// Lifecycle state of a petty-cash box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxState {
    /// Box is open and accepts expenses.
    Open,
    /// Box is frozen while its settlement is produced; expenses are rejected.
    Consolidating,
    /// Box is permanently closed with an archived settlement document.
    Consolidated,
}

impl BoxState {
    /// Returns the string representation of the state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Consolidating => "consolidating",
            Self::Consolidated => "consolidated",
        }
    }

    /// Parses a state from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "consolidating" => Some(Self::Consolidating),
            "consolidated" => Some(Self::Consolidated),
            _ => None,
        }
    }

    /// Returns true if the box occupies the single active slot
    /// (at most one box system-wide is Open or Consolidating).
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Open | Self::Consolidating)
    }

    /// Returns true if new expenses may be registered against the box.
    #[must_use]
    pub fn accepts_expenses(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true if the box is terminal and immutable.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Consolidated)
    }
}

impl fmt::Display for BoxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A petty-cash box: one fund period under a custodian.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PettyCashBox {
    /// Unique identifier.
    pub id: BoxId,
    /// Person accountable for the fund.
    pub custodian: String,
    /// External tax/ID reference of the custodian.
    pub external_id: String,
    /// Free-text purpose of the fund.
    pub concept: String,
    /// Amount the fund was opened with (positive).
    pub initial_amount: Decimal,
    /// Date the fund period started.
    pub opened_at: NaiveDate,
    /// Current lifecycle state.
    pub state: BoxState,
    /// Date of consolidation; set only once Consolidated.
    pub consolidated_at: Option<NaiveDate>,
    /// Archive reference of the settlement document; set only once Consolidated.
    pub document_ref: Option<String>,
    /// Record-store optimistic-lock version.
    pub version: i64,
}

/// A single disbursement recorded against a box.
///
/// Expenses reference their box one-directionally via `box_id` and are
/// immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier.
    pub id: ExpenseId,
    /// Owning box.
    pub box_id: BoxId,
    /// Date of the disbursement.
    pub date: NaiveDate,
    /// Who was paid.
    pub payee: String,
    /// External tax/ID reference of the payee.
    pub external_id: String,
    /// Free-text purpose of the expense.
    pub concept: String,
    /// Optional cost center allocation.
    pub cost_center: Option<String>,
    /// Disbursed amount (positive).
    pub amount: Decimal,
    /// Optional pointer to a receipt document.
    pub voucher_ref: Option<String>,
}

/// Input for opening a new box.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenBoxInput {
    /// Person accountable for the fund.
    pub custodian: String,
    /// External tax/ID reference of the custodian.
    pub external_id: String,
    /// Free-text purpose of the fund.
    pub concept: String,
    /// Amount to open the fund with.
    pub initial_amount: Decimal,
}

/// Input for registering a new expense against the open box.
#[derive(Debug, Clone, Deserialize)]
pub struct NewExpenseInput {
    /// Date of the disbursement.
    pub date: NaiveDate,
    /// Who was paid.
    pub payee: String,
    /// External tax/ID reference of the payee.
    pub external_id: String,
    /// Free-text purpose of the expense.
    pub concept: String,
    /// Optional cost center allocation.
    pub cost_center: Option<String>,
    /// Disbursed amount.
    pub amount: Decimal,
    /// Optional pointer to a receipt document.
    pub voucher_ref: Option<String>,
}
