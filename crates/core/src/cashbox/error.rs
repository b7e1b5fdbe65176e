//! Cashbox error types for expense admission and lifecycle operations.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::BoxState;

/// Errors rejecting a candidate expense, in the order they are checked.
#[derive(Debug, Error)]
pub enum BalanceError {
    /// The box is not open for expenses.
    #[error("Box is {state}, not open for expenses")]
    NotOpen {
        /// The state the box was found in.
        state: BoxState,
    },

    /// Expense amount must be positive.
    #[error("Expense amount must be positive")]
    NonPositiveAmount,

    /// Expense amount exceeds the configured absolute ceiling.
    #[error("Expense amount {amount} exceeds the hard cap {cap}")]
    ExceedsHardCap {
        /// The candidate amount.
        amount: Decimal,
        /// The configured ceiling.
        cap: Decimal,
    },

    /// The box is already in deficit; no further expenses are admitted
    /// until the box is consolidated.
    #[error("Box is already in deficit (balance {balance}); consolidate before registering expenses")]
    AlreadyInDeficit {
        /// The negative available balance.
        balance: Decimal,
    },

    /// Expense amount exceeds the remaining balance.
    #[error("Expense amount {requested} exceeds available balance {available}")]
    InsufficientBalance {
        /// The candidate amount.
        requested: Decimal,
        /// The remaining balance.
        available: Decimal,
    },
}

impl BalanceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotOpen { .. } => "BOX_NOT_OPEN",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::ExceedsHardCap { .. } => "EXCEEDS_HARD_CAP",
            Self::AlreadyInDeficit { .. } => "ALREADY_IN_DEFICIT",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NonPositiveAmount | Self::ExceedsHardCap { .. } => 400,
            Self::NotOpen { .. }
            | Self::AlreadyInDeficit { .. }
            | Self::InsufficientBalance { .. } => 422,
        }
    }
}

/// Errors from box lifecycle operations.
#[derive(Debug, Error)]
pub enum CashboxError {
    /// An Open or Consolidating box already occupies the active slot.
    #[error("An active box already exists in state {state}")]
    ActiveBoxExists {
        /// The state of the existing active box.
        state: BoxState,
    },

    /// Initial amount must be positive.
    #[error("Initial amount must be positive")]
    NonPositiveAmount,

    /// Custodian name is required.
    #[error("Custodian is required")]
    MissingCustodian,

    /// Record store error.
    #[error("Record store error: {0}")]
    Store(String),
}

impl CashboxError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ActiveBoxExists { .. } => "ACTIVE_BOX_EXISTS",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::MissingCustodian => "MISSING_CUSTODIAN",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::ActiveBoxExists { .. } => 409,
            Self::NonPositiveAmount | Self::MissingCustodian => 400,
            Self::Store(_) => 502,
        }
    }
}
