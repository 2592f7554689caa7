pub mod services;

// Re-export the shared ledger domain
pub use ledger_core::{
    Account, AccountId, Direction, Holding, HoldingId, MONEY_DECIMALS, Money, NewOrder, Order,
    OrderId, OrderStatus, OrderType, Quantity, StockCode, StockCodeError, Timestamp,
    has_money_precision, order_value,
};

pub use services::{MAX_MONEY, OrderValidator, ValidationError};
