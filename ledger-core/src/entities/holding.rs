use crate::value_objects::{AccountId, HoldingId, Quantity, StockCode, Timestamp};
use serde::{Deserialize, Serialize};

/// Shares of one stock held by one account.
///
/// At most one row exists per (account, stock code), and a stored row always
/// has a positive quantity: positions reduced to zero are removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub id: HoldingId,
    pub account_id: AccountId,
    pub stock_code: StockCode,
    pub quantity: Quantity,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
