use crate::domain::{AccountId, Holding, Quantity, StockCode};
use async_trait::async_trait;

use super::{LedgerResult, UnitOfWork};

/// Reads and adjusts stock positions.
#[async_trait]
pub trait HoldingLedger<Tx: UnitOfWork>: Send + Sync {
    /// `Ok(None)` when the account holds no shares of `stock_code`.
    async fn get_by_account_and_symbol(
        &self,
        tx: &mut Tx,
        account_id: AccountId,
        stock_code: &StockCode,
    ) -> LedgerResult<Option<Holding>>;

    async fn list_by_account(&self, tx: &mut Tx, account_id: AccountId)
    -> LedgerResult<Vec<Holding>>;

    /// Set the position to `quantity`. A quantity of zero or less removes the
    /// row; removing an absent row is not an error.
    async fn set_quantity(
        &self,
        tx: &mut Tx,
        account_id: AccountId,
        stock_code: &StockCode,
        quantity: Quantity,
    ) -> LedgerResult<()>;

    /// Insert a position, or add `quantity` to the existing one.
    async fn create(
        &self,
        tx: &mut Tx,
        account_id: AccountId,
        stock_code: &StockCode,
        quantity: Quantity,
    ) -> LedgerResult<()>;
}
