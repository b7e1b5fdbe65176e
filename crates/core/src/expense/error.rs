//! Expense registration error types.

use thiserror::Error;

use crate::cashbox::BalanceError;

/// Errors from expense registration.
#[derive(Debug, Error)]
pub enum ExpenseError {
    /// No box is currently open.
    #[error("No open box to register expenses against")]
    NoOpenBox,

    /// The box is frozen for consolidation; no expenses are admitted.
    #[error("Box is frozen for consolidation")]
    BoxFrozen,

    /// The balance engine rejected the expense.
    #[error(transparent)]
    Balance(#[from] BalanceError),

    /// Another writer touched the box between our read and our write.
    /// Retry by re-reading the box state.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// Record store error.
    #[error("Record store error: {0}")]
    Store(String),
}

impl ExpenseError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoOpenBox => "NO_OPEN_BOX",
            Self::BoxFrozen => "BOX_FROZEN",
            Self::Balance(e) => e.error_code(),
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NoOpenBox => 404,
            Self::BoxFrozen | Self::ConcurrentModification => 409,
            Self::Balance(e) => e.http_status_code(),
            Self::Store(_) => 502,
        }
    }

    /// Returns true if the operation can be retried after re-reading state.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(ExpenseError::NoOpenBox.error_code(), "NO_OPEN_BOX");
        assert_eq!(ExpenseError::BoxFrozen.error_code(), "BOX_FROZEN");
        assert_eq!(
            ExpenseError::ConcurrentModification.error_code(),
            "CONCURRENT_MODIFICATION"
        );
        assert_eq!(
            ExpenseError::Balance(BalanceError::InsufficientBalance {
                requested: dec!(2),
                available: dec!(1),
            })
            .error_code(),
            "INSUFFICIENT_BALANCE"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ExpenseError::NoOpenBox.http_status_code(), 404);
        assert_eq!(ExpenseError::BoxFrozen.http_status_code(), 409);
        assert_eq!(ExpenseError::ConcurrentModification.http_status_code(), 409);
        assert_eq!(ExpenseError::Store("down".into()).http_status_code(), 502);
    }

    #[test]
    fn test_retryable() {
        assert!(ExpenseError::ConcurrentModification.is_retryable());
        assert!(!ExpenseError::BoxFrozen.is_retryable());
        assert!(!ExpenseError::NoOpenBox.is_retryable());
    }
}
