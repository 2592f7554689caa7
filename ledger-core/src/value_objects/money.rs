//! Cash amounts.
//!
//! Balances and prices are exact decimals persisted with two fractional
//! digits. Nothing here rounds: values with finer precision are rejected at
//! the boundary instead.

use rust_decimal::Decimal;

use super::Quantity;

/// Fractional digits kept for balances and prices.
pub const MONEY_DECIMALS: u32 = 2;

pub type Money = Decimal;

/// True when `value` fits the persisted precision without rounding.
pub fn has_money_precision(value: Money) -> bool {
    value.normalize().scale() <= MONEY_DECIMALS
}

/// Cash value of `quantity` shares at `price`.
///
/// Returns `None` if the product is not representable.
pub fn order_value(price: Money, quantity: Quantity) -> Option<Money> {
    price.checked_mul(Decimal::from(quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_precision() {
        assert!(has_money_precision(dec!(50)));
        assert!(has_money_precision(dec!(50.25)));
        assert!(has_money_precision(dec!(50.2500)));
        assert!(!has_money_precision(dec!(50.255)));
    }

    #[test]
    fn test_order_value_is_exact() {
        assert_eq!(order_value(dec!(50), 100), Some(dec!(5000)));
        assert_eq!(order_value(dec!(0.01), 3), Some(dec!(0.03)));
        assert_eq!(order_value(Decimal::MAX, 2), None);
    }
}
