use crate::domain::{AccountId, Money, OrderId, OrderStatus, Quantity, StockCode};
use thiserror::Error;

/// Failures raised by the transactional store itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Another transaction committed a conflicting write first. The whole
    /// operation may be retried from the start.
    #[error("transaction aborted due to a conflicting concurrent write")]
    Conflict,

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict)
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Error kinds returned by the ledgers and the trading engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Money, available: Money },

    #[error(
        "insufficient holding quantity for {stock_code}: requested {requested}, available {available}"
    )]
    InsufficientHoldingQuantity {
        stock_code: StockCode,
        requested: Quantity,
        available: Quantity,
    },

    #[error("order {order_id} is not in a cancelable state ({status})")]
    OrderNotCancelable {
        order_id: OrderId,
        status: OrderStatus,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Only lost write conflicts are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Store(e) if e.is_retryable())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LedgerError::AccountNotFound(_) | LedgerError::OrderNotFound(_)
        )
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_conflicts_are_retryable() {
        assert!(LedgerError::Store(StoreError::Conflict).is_retryable());
        assert!(!LedgerError::Store(StoreError::Backend("boom".into())).is_retryable());
        assert!(!LedgerError::AccountNotFound(1).is_retryable());
        assert!(!LedgerError::OrderNotCancelable {
            order_id: 1,
            status: OrderStatus::Canceled
        }
        .is_retryable());
    }

    #[test]
    fn test_store_error_converts() {
        let err: LedgerError = StoreError::Conflict.into();
        assert_eq!(err, LedgerError::Store(StoreError::Conflict));
        assert!(!err.is_not_found());
        assert!(LedgerError::OrderNotFound(3).is_not_found());
    }
}
