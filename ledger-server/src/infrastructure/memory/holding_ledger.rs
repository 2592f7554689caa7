use crate::application::ports::{HoldingLedger, LedgerResult};
use crate::domain::{AccountId, Holding, Quantity, StockCode};
use async_trait::async_trait;

use super::InMemoryTx;

/// Holding access for [`InMemoryTx`]
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryHoldingLedger;

impl InMemoryHoldingLedger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HoldingLedger<InMemoryTx> for InMemoryHoldingLedger {
    async fn get_by_account_and_symbol(
        &self,
        tx: &mut InMemoryTx,
        account_id: AccountId,
        stock_code: &StockCode,
    ) -> LedgerResult<Option<Holding>> {
        Ok(tx.holding(account_id, stock_code))
    }

    async fn list_by_account(
        &self,
        tx: &mut InMemoryTx,
        account_id: AccountId,
    ) -> LedgerResult<Vec<Holding>> {
        Ok(tx.holdings_of(account_id))
    }

    async fn set_quantity(
        &self,
        tx: &mut InMemoryTx,
        account_id: AccountId,
        stock_code: &StockCode,
        quantity: Quantity,
    ) -> LedgerResult<()> {
        tx.put_holding_quantity(account_id, stock_code, quantity)?;
        Ok(())
    }

    async fn create(
        &self,
        tx: &mut InMemoryTx,
        account_id: AccountId,
        stock_code: &StockCode,
        quantity: Quantity,
    ) -> LedgerResult<()> {
        tx.add_to_holding(account_id, stock_code, quantity)?;
        Ok(())
    }
}
