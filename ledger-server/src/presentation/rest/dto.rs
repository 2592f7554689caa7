use crate::application::{BalanceView, HoldingView};
use crate::domain::{AccountId, Money, Order, OrderId, Quantity, Timestamp};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/orders`
///
/// Enumerations arrive as plain strings and are parsed by the handler so
/// that a bad value yields a field-specific 400 instead of a generic body
/// rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub account_id: AccountId,
    pub stock_code: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub direction: String,
    pub quantity: Quantity,
    /// Accepts a JSON number or a decimal string
    pub price: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub account_id: AccountId,
    pub stock_code: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub direction: String,
    pub quantity: Quantity,
    pub price: Money,
    pub filled_quantity: Quantity,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id,
            account_id: order.account_id,
            stock_code: order.stock_code.to_string(),
            order_type: order.order_type.to_string(),
            direction: order.direction.to_string(),
            quantity: order.quantity,
            price: order.price,
            filled_quantity: order.filled_quantity,
            status: order.status.to_string(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub account_number: String,
    pub balance: Money,
}

impl From<BalanceView> for BalanceResponse {
    fn from(view: BalanceView) -> Self {
        BalanceResponse {
            account_number: view.account_number,
            balance: view.balance,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingResponse {
    pub stock_code: String,
    pub quantity: Quantity,
}

impl From<HoldingView> for HoldingResponse {
    fn from(view: HoldingView) -> Self {
        HoldingResponse {
            stock_code: view.stock_code.to_string(),
            quantity: view.quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
