use crate::domain::{NewOrder, Order, OrderId, OrderStatus};
use async_trait::async_trait;

use super::{LedgerResult, UnitOfWork};

#[async_trait]
pub trait OrderLedger<Tx: UnitOfWork>: Send + Sync {
    /// Insert the order and return the stored row with its generated id.
    async fn create(&self, tx: &mut Tx, order: NewOrder) -> LedgerResult<Order>;

    /// Fails with `LedgerError::OrderNotFound` if absent.
    async fn get_by_id(&self, tx: &mut Tx, id: OrderId) -> LedgerResult<Order>;

    async fn update_status(&self, tx: &mut Tx, id: OrderId, status: OrderStatus)
    -> LedgerResult<()>;
}
