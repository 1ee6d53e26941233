//! Error taxonomy for engine operations.
//!
//! Every engine operation reports failures through [`EngineError`], a closed
//! set of tagged variants. The HTTP boundary maps variants to status codes;
//! nothing dispatches on error strings or type names.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors from engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The entity is absent or soft-deleted.
    #[error("not found: {0}")]
    NotFound(String),

    /// A bank/ownership rule forbids the operation.
    #[error("policy violation: {0}")]
    PolicyViolation(String),

    /// The sender's balance cannot cover the requested amount.
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Balance at the time of the check.
        balance: Decimal,
        /// Amount the caller asked for.
        requested: Decimal,
    },

    /// Required configuration is missing or inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The ledger store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures of the ledger store itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Generic I/O or transaction failure.
    #[error("store failure: {0}")]
    Backend(String),

    /// Lock wait or connection acquisition exceeded its bound.
    #[error("timed out: {0}")]
    Timeout(String),

    /// A rollback after a failed write did not complete. The connection
    /// state is ambiguous; this is never swallowed.
    #[error("rollback failed during {operation}: {reason}")]
    RollbackFailed {
        /// Operation whose rollback failed.
        operation: String,
        /// The underlying rollback error.
        reason: String,
    },
}

impl EngineError {
    /// Returns a stable machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::PolicyViolation(_) => "POLICY_VIOLATION",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Store(StoreError::Backend(_)) => "STORE_ERROR",
            Self::Store(StoreError::Timeout(_)) => "TIMEOUT",
            Self::Store(StoreError::RollbackFailed { .. }) => "ROLLBACK_FAILED",
        }
    }

    /// Returns the HTTP status code the boundary layer should answer with.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::PolicyViolation(_) | Self::InsufficientFunds { .. } => 422,
            Self::Configuration(_) | Self::Store(StoreError::Backend(_) | StoreError::RollbackFailed { .. }) => 500,
            Self::Store(StoreError::Timeout(_)) => 503,
        }
    }

    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(StoreError::Timeout(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_codes() {
        assert_eq!(EngineError::NotFound("x".into()).http_status_code(), 404);
        assert_eq!(
            EngineError::PolicyViolation("x".into()).http_status_code(),
            422
        );
        assert_eq!(
            EngineError::InsufficientFunds {
                balance: dec!(1),
                requested: dec!(2),
            }
            .http_status_code(),
            422
        );
        assert_eq!(
            EngineError::Configuration("x".into()).http_status_code(),
            500
        );
        assert_eq!(
            EngineError::Store(StoreError::Backend("x".into())).http_status_code(),
            500
        );
        assert_eq!(
            EngineError::Store(StoreError::Timeout("x".into())).http_status_code(),
            503
        );
        assert_eq!(
            EngineError::Store(StoreError::RollbackFailed {
                operation: "withdraw".into(),
                reason: "x".into(),
            })
            .http_status_code(),
            500
        );
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(EngineError::NotFound("x".into()).error_code(), "NOT_FOUND");
        assert_eq!(
            EngineError::PolicyViolation("x".into()).error_code(),
            "POLICY_VIOLATION"
        );
        assert_eq!(
            EngineError::InsufficientFunds {
                balance: dec!(0),
                requested: dec!(1),
            }
            .error_code(),
            "INSUFFICIENT_FUNDS"
        );
        assert_eq!(
            EngineError::Store(StoreError::Timeout("x".into())).error_code(),
            "TIMEOUT"
        );
    }

    #[test]
    fn test_only_timeouts_are_retryable() {
        assert!(EngineError::Store(StoreError::Timeout("x".into())).is_retryable());
        assert!(!EngineError::Store(StoreError::Backend("x".into())).is_retryable());
        assert!(!EngineError::NotFound("x".into()).is_retryable());
        assert!(
            !EngineError::Store(StoreError::RollbackFailed {
                operation: "transfer".into(),
                reason: "x".into(),
            })
            .is_retryable()
        );
    }

    #[test]
    fn test_insufficient_funds_message_carries_amounts() {
        let err = EngineError::InsufficientFunds {
            balance: dec!(70.00),
            requested: dec!(80.00),
        };
        assert_eq!(
            err.to_string(),
            "insufficient funds: balance 70.00, requested 80.00"
        );
    }
}
