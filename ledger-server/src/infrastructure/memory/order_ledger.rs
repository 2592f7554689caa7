use crate::application::ports::{LedgerError, LedgerResult, OrderLedger};
use crate::domain::{NewOrder, Order, OrderId, OrderStatus};
use async_trait::async_trait;
use chrono::Utc;

use super::InMemoryTx;

/// Order access for [`InMemoryTx`]
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryOrderLedger;

impl InMemoryOrderLedger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OrderLedger<InMemoryTx> for InMemoryOrderLedger {
    async fn create(&self, tx: &mut InMemoryTx, order: NewOrder) -> LedgerResult<Order> {
        Ok(tx.insert_order(order)?)
    }

    async fn get_by_id(&self, tx: &mut InMemoryTx, id: OrderId) -> LedgerResult<Order> {
        tx.order(id).ok_or(LedgerError::OrderNotFound(id))
    }

    async fn update_status(
        &self,
        tx: &mut InMemoryTx,
        id: OrderId,
        status: OrderStatus,
    ) -> LedgerResult<()> {
        let mut order = tx.order(id).ok_or(LedgerError::OrderNotFound(id))?;
        order.status = status;
        order.updated_at = Utc::now();
        tx.put_order(order);
        Ok(())
    }
}
