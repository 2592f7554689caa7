//! Ledger Core Domain
//!
//! Pure domain types for the mini ledger: cash accounts, stock holdings and
//! the orders placed against them. No async, no I/O.

pub mod entities;
pub mod value_objects;

// Re-export value objects at crate root for convenience
pub use value_objects::{
    AccountId, Direction, HoldingId, MONEY_DECIMALS, Money, OrderId, OrderType, Quantity,
    StockCode, StockCodeError, Timestamp, has_money_precision, order_value,
};

// Re-export entities at crate root
pub use entities::{Account, Holding, NewOrder, Order, OrderStatus};
