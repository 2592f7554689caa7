mod direction;
mod money;
mod order_type;
mod stock_code;

pub use direction::Direction;
pub use money::{MONEY_DECIMALS, Money, has_money_precision, order_value};
pub use order_type::OrderType;
pub use stock_code::{StockCode, StockCodeError};

pub type AccountId = i64;
pub type HoldingId = i64;
pub type OrderId = i64;
/// Whole number of shares.
pub type Quantity = i64;
pub type Timestamp = chrono::DateTime<chrono::Utc>;
