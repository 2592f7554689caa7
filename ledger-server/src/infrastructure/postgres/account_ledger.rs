use super::PostgresTx;
use crate::application::ports::{AccountLedger, LedgerError, LedgerResult, StoreError};
use crate::domain::{Account, AccountId, Money};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, FromRow)]
struct AccountRow {
    id: i64,
    account_number: String,
    balance: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            account_number: row.account_number,
            balance: row.balance,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresAccountLedger;

impl PostgresAccountLedger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AccountLedger<PostgresTx> for PostgresAccountLedger {
    async fn get_by_id(&self, tx: &mut PostgresTx, id: AccountId) -> LedgerResult<Account> {
        sqlx::query_as::<_, AccountRow>(
            "SELECT id, account_number, balance, created_at, updated_at \
             FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(tx.conn())
        .await
        .map_err(StoreError::from)?
        .map(Account::from)
        .ok_or(LedgerError::AccountNotFound(id))
    }

    async fn update_balance(
        &self,
        tx: &mut PostgresTx,
        id: AccountId,
        balance: Money,
    ) -> LedgerResult<()> {
        let updated = sqlx::query(
            "UPDATE accounts SET balance = $1, updated_at = now() WHERE id = $2",
        )
        .bind(balance)
        .bind(id)
        .execute(tx.conn())
        .await
        .map_err(StoreError::from)?
        .rows_affected();

        if updated == 0 {
            return Err(LedgerError::AccountNotFound(id));
        }
        Ok(())
    }
}
