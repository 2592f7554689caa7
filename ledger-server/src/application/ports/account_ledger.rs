use crate::domain::{Account, AccountId, Money};
use async_trait::async_trait;

use super::{LedgerResult, UnitOfWork};

/// Reads accounts and writes their balances.
#[async_trait]
pub trait AccountLedger<Tx: UnitOfWork>: Send + Sync {
    /// Fails with `LedgerError::AccountNotFound` if no row exists.
    async fn get_by_id(&self, tx: &mut Tx, id: AccountId) -> LedgerResult<Account>;

    /// Overwrite the balance (absolute value, not a delta) and bump `updated_at`.
    async fn update_balance(&self, tx: &mut Tx, id: AccountId, balance: Money)
    -> LedgerResult<()>;
}
