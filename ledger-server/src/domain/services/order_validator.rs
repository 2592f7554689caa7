use crate::domain::{Money, Quantity, has_money_precision, order_value};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

/// Largest amount a DECIMAL(15,2) balance or price column can hold.
pub const MAX_MONEY: Money = dec!(9999999999999.99);

/// Validates order input before it reaches the trading engine
pub struct OrderValidator;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError {
            field,
            reason: reason.into(),
        }
    }
}

impl OrderValidator {
    /// Check quantity and price of a new order.
    ///
    /// Prices finer than the persisted precision are rejected rather than
    /// rounded, and the order value must fit in a balance column so the
    /// reservation arithmetic can never overflow.
    pub fn validate_create(quantity: Quantity, price: Money) -> Result<(), ValidationError> {
        if quantity <= 0 {
            return Err(ValidationError::new(
                "quantity",
                "must be greater than zero",
            ));
        }

        if price <= Decimal::ZERO {
            return Err(ValidationError::new("price", "must be greater than zero"));
        }

        if !has_money_precision(price) {
            return Err(ValidationError::new(
                "price",
                "at most 2 fractional digits allowed",
            ));
        }

        match order_value(price, quantity) {
            Some(value) if value <= MAX_MONEY => Ok(()),
            _ => Err(ValidationError::new(
                "price",
                format!("order value exceeds maximum of {}", MAX_MONEY),
            )),
        }
    }

    /// Check an opening balance loaded from configuration.
    pub fn validate_balance(balance: Money) -> Result<(), ValidationError> {
        if balance < Decimal::ZERO {
            return Err(ValidationError::new("balance", "must not be negative"));
        }
        if !has_money_precision(balance) {
            return Err(ValidationError::new(
                "balance",
                "at most 2 fractional digits allowed",
            ));
        }
        if balance > MAX_MONEY {
            return Err(ValidationError::new(
                "balance",
                format!("exceeds maximum of {}", MAX_MONEY),
            ));
        }
        Ok(())
    }
}
