use super::PostgresTx;
use crate::application::ports::{HoldingLedger, LedgerResult, StoreError};
use crate::domain::{AccountId, Holding, Quantity, StockCode};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

const HOLDING_COLUMNS: &str = "id, account_id, stock_code, quantity, created_at, updated_at";

#[derive(Debug, FromRow)]
struct HoldingRow {
    id: i64,
    account_id: i64,
    stock_code: String,
    quantity: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<HoldingRow> for Holding {
    type Error = StoreError;

    fn try_from(row: HoldingRow) -> Result<Self, Self::Error> {
        let stock_code = StockCode::new(&row.stock_code).map_err(|e| {
            StoreError::Backend(format!("holding {} has bad stock_code: {}", row.id, e))
        })?;
        Ok(Holding {
            id: row.id,
            account_id: row.account_id,
            stock_code,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresHoldingLedger;

impl PostgresHoldingLedger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HoldingLedger<PostgresTx> for PostgresHoldingLedger {
    async fn get_by_account_and_symbol(
        &self,
        tx: &mut PostgresTx,
        account_id: AccountId,
        stock_code: &StockCode,
    ) -> LedgerResult<Option<Holding>> {
        let sql = format!(
            "SELECT {} FROM holdings WHERE account_id = $1 AND stock_code = $2",
            HOLDING_COLUMNS
        );
        let row = sqlx::query_as::<_, HoldingRow>(&sql)
            .bind(account_id)
            .bind(stock_code.as_str())
            .fetch_optional(tx.conn())
            .await
            .map_err(StoreError::from)?;

        Ok(row.map(Holding::try_from).transpose()?)
    }

    async fn list_by_account(
        &self,
        tx: &mut PostgresTx,
        account_id: AccountId,
    ) -> LedgerResult<Vec<Holding>> {
        let sql = format!(
            "SELECT {} FROM holdings WHERE account_id = $1 ORDER BY id",
            HOLDING_COLUMNS
        );
        let rows = sqlx::query_as::<_, HoldingRow>(&sql)
            .bind(account_id)
            .fetch_all(tx.conn())
            .await
            .map_err(StoreError::from)?;

        Ok(rows
            .into_iter()
            .map(Holding::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn set_quantity(
        &self,
        tx: &mut PostgresTx,
        account_id: AccountId,
        stock_code: &StockCode,
        quantity: Quantity,
    ) -> LedgerResult<()> {
        if quantity <= 0 {
            sqlx::query("DELETE FROM holdings WHERE account_id = $1 AND stock_code = $2")
                .bind(account_id)
                .bind(stock_code.as_str())
                .execute(tx.conn())
                .await
                .map_err(StoreError::from)?;
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO holdings (account_id, stock_code, quantity) VALUES ($1, $2, $3) \
             ON CONFLICT (account_id, stock_code) \
             DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = now()",
        )
        .bind(account_id)
        .bind(stock_code.as_str())
        .bind(quantity)
        .execute(tx.conn())
        .await
        .map_err(StoreError::from)?;
        Ok(())
    }

    async fn create(
        &self,
        tx: &mut PostgresTx,
        account_id: AccountId,
        stock_code: &StockCode,
        quantity: Quantity,
    ) -> LedgerResult<()> {
        sqlx::query(
            "INSERT INTO holdings (account_id, stock_code, quantity) VALUES ($1, $2, $3) \
             ON CONFLICT (account_id, stock_code) \
             DO UPDATE SET quantity = holdings.quantity + EXCLUDED.quantity, updated_at = now()",
        )
        .bind(account_id)
        .bind(stock_code.as_str())
        .bind(quantity)
        .execute(tx.conn())
        .await
        .map_err(StoreError::from)?;
        Ok(())
    }
}
