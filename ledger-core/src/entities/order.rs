use crate::value_objects::{
    AccountId, Direction, Money, OrderId, OrderType, Quantity, StockCode, Timestamp, order_value,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Accepted, nothing executed yet
    Pending,
    /// Some quantity executed
    Partial,
    /// Fully executed
    Filled,
    /// Canceled by the owner; the unfilled reservation was returned
    Canceled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Partial => "PARTIAL",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Canceled => "CANCELED",
        }
    }

    /// Only orders with an open remainder can be canceled.
    pub fn is_cancelable(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Partial)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "PARTIAL" => Ok(OrderStatus::Partial),
            "FILLED" => Ok(OrderStatus::Filled),
            "CANCELED" => Ok(OrderStatus::Canceled),
            _ => Err("Invalid order status"),
        }
    }
}

/// An order about to be inserted; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub account_id: AccountId,
    pub stock_code: StockCode,
    pub order_type: OrderType,
    pub direction: Direction,
    pub quantity: Quantity,
    pub price: Money,
    pub filled_quantity: Quantity,
    pub status: OrderStatus,
}

impl NewOrder {
    /// A freshly placed order: PENDING with nothing filled.
    pub fn pending(
        account_id: AccountId,
        stock_code: StockCode,
        order_type: OrderType,
        direction: Direction,
        quantity: Quantity,
        price: Money,
    ) -> Self {
        NewOrder {
            account_id,
            stock_code,
            order_type,
            direction,
            quantity,
            price,
            filled_quantity: 0,
            status: OrderStatus::Pending,
        }
    }

    pub fn into_order(self, id: OrderId, now: Timestamp) -> Order {
        Order {
            id,
            account_id: self.account_id,
            stock_code: self.stock_code,
            order_type: self.order_type,
            direction: self.direction,
            quantity: self.quantity,
            price: self.price,
            filled_quantity: self.filled_quantity,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub account_id: AccountId,
    pub stock_code: StockCode,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub direction: Direction,
    pub quantity: Quantity,
    pub price: Money,
    pub filled_quantity: Quantity,
    pub status: OrderStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    /// Quantity still open, i.e. still reserved against the account.
    pub fn unfilled_quantity(&self) -> Quantity {
        self.quantity - self.filled_quantity
    }

    /// Cash held back for the open remainder of a BUY order.
    ///
    /// `None` only if the value overflows, which validated orders cannot reach.
    pub fn unfilled_value(&self) -> Option<Money> {
        order_value(self.price, self.unfilled_quantity())
    }

    pub fn is_cancelable(&self) -> bool {
        self.status.is_cancelable()
    }
}
