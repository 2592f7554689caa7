use super::PostgresTx;
use crate::application::ports::{LedgerError, LedgerResult, OrderLedger, StoreError};
use crate::domain::{Direction, NewOrder, Order, OrderId, OrderStatus, OrderType, StockCode};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

const ORDER_COLUMNS: &str = "id, account_id, stock_code, type, direction, quantity, price, \
     filled_quantity, status, created_at, updated_at";

#[derive(Debug, FromRow)]
struct OrderRow {
    id: i64,
    account_id: i64,
    stock_code: String,
    #[sqlx(rename = "type")]
    order_type: String,
    direction: String,
    quantity: i64,
    price: Decimal,
    filled_quantity: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |column: &str, e: &dyn std::fmt::Display| {
            StoreError::Backend(format!("order {} has bad {}: {}", id, column, e))
        };

        Ok(Order {
            id: row.id,
            account_id: row.account_id,
            stock_code: StockCode::new(&row.stock_code).map_err(|e| corrupt("stock_code", &e))?,
            order_type: row
                .order_type
                .parse::<OrderType>()
                .map_err(|e| corrupt("type", &e))?,
            direction: row
                .direction
                .parse::<Direction>()
                .map_err(|e| corrupt("direction", &e))?,
            quantity: row.quantity,
            price: row.price,
            filled_quantity: row.filled_quantity,
            status: row
                .status
                .parse::<OrderStatus>()
                .map_err(|e| corrupt("status", &e))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresOrderLedger;

impl PostgresOrderLedger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OrderLedger<PostgresTx> for PostgresOrderLedger {
    async fn create(&self, tx: &mut PostgresTx, order: NewOrder) -> LedgerResult<Order> {
        let sql = format!(
            "INSERT INTO orders \
             (account_id, stock_code, type, direction, quantity, price, filled_quantity, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            ORDER_COLUMNS
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(order.account_id)
            .bind(order.stock_code.as_str())
            .bind(order.order_type.as_str())
            .bind(order.direction.as_str())
            .bind(order.quantity)
            .bind(order.price)
            .bind(order.filled_quantity)
            .bind(order.status.as_str())
            .fetch_one(tx.conn())
            .await
            .map_err(StoreError::from)?;

        Ok(Order::try_from(row)?)
    }

    async fn get_by_id(&self, tx: &mut PostgresTx, id: OrderId) -> LedgerResult<Order> {
        let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(tx.conn())
            .await
            .map_err(StoreError::from)?
            .ok_or(LedgerError::OrderNotFound(id))?;

        Ok(Order::try_from(row)?)
    }

    async fn update_status(
        &self,
        tx: &mut PostgresTx,
        id: OrderId,
        status: OrderStatus,
    ) -> LedgerResult<()> {
        let updated =
            sqlx::query("UPDATE orders SET status = $1, updated_at = now() WHERE id = $2")
                .bind(status.as_str())
                .bind(id)
                .execute(tx.conn())
                .await
                .map_err(StoreError::from)?
                .rows_affected();

        if updated == 0 {
            return Err(LedgerError::OrderNotFound(id));
        }
        Ok(())
    }
}
