use crate::application::ports::{AccountLedger, LedgerError, LedgerResult};
use crate::domain::{Account, AccountId, Money};
use async_trait::async_trait;
use chrono::Utc;

use super::InMemoryTx;

/// Account access for [`InMemoryTx`]
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryAccountLedger;

impl InMemoryAccountLedger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AccountLedger<InMemoryTx> for InMemoryAccountLedger {
    async fn get_by_id(&self, tx: &mut InMemoryTx, id: AccountId) -> LedgerResult<Account> {
        tx.account(id).ok_or(LedgerError::AccountNotFound(id))
    }

    async fn update_balance(
        &self,
        tx: &mut InMemoryTx,
        id: AccountId,
        balance: Money,
    ) -> LedgerResult<()> {
        let mut account = tx.account(id).ok_or(LedgerError::AccountNotFound(id))?;
        account.balance = balance;
        account.updated_at = Utc::now();
        tx.put_account(account)?;
        Ok(())
    }
}
