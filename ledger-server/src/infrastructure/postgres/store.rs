use super::schema::{INSERT_SEED_ACCOUNT, INSERT_SEED_HOLDING, MIGRATIONS, SELECT_ACCOUNT_ID};
use crate::application::ports::{LedgerStore, StoreError, StoreResult, UnitOfWork};
use crate::infrastructure::config::{SeedConfig, StoreConfig};
use async_trait::async_trait;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::time::Duration;
use tracing::{debug, info};

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => match db.code().as_deref() {
                // serialization_failure, deadlock_detected
                Some("40001") | Some("40P01") => StoreError::Conflict,
                Some(code) if code.starts_with("23") => {
                    StoreError::Constraint(db.message().to_string())
                }
                _ => StoreError::Backend(db.to_string()),
            },
            other @ (sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)) => StoreError::Unavailable(other.to_string()),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Ledger store backed by PostgreSQL or CockroachDB
///
/// Every unit of work is a SERIALIZABLE transaction; lost races surface as
/// [`StoreError::Conflict`] on the statement or the commit that detects them.
#[derive(Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.database_url)
            .await?;
        info!(max_connections = config.max_connections, "connected to database");
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the tables if they do not exist.
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in MIGRATIONS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!(statements = MIGRATIONS.len(), "schema migrations applied");
        Ok(())
    }

    /// Insert seed rows. Accounts that already exist are left untouched,
    /// including their holdings.
    pub async fn apply_seed(&self, seed: &SeedConfig) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        for account in &seed.accounts {
            let inserted = sqlx::query(INSERT_SEED_ACCOUNT)
                .bind(&account.account_number)
                .bind(account.balance)
                .execute(&mut *tx)
                .await?
                .rows_affected();

            if inserted == 0 {
                debug!(account_number = %account.account_number, "seed account already present");
                continue;
            }

            let account_id: i64 = sqlx::query_scalar(SELECT_ACCOUNT_ID)
                .bind(&account.account_number)
                .fetch_one(&mut *tx)
                .await?;

            for holding in &account.holdings {
                sqlx::query(INSERT_SEED_HOLDING)
                    .bind(account_id)
                    .bind(holding.stock_code.as_str())
                    .bind(holding.quantity)
                    .execute(&mut *tx)
                    .await?;
            }

            info!(
                account_id,
                account_number = %account.account_number,
                balance = %account.balance,
                "seeded account"
            );
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    type Tx = PostgresTx;

    async fn begin(&self) -> StoreResult<PostgresTx> {
        let mut inner = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *inner)
            .await?;
        Ok(PostgresTx { inner })
    }
}

/// A SERIALIZABLE database transaction. Dropping it without committing rolls
/// it back when the connection returns to the pool.
pub struct PostgresTx {
    inner: Transaction<'static, Postgres>,
}

impl PostgresTx {
    pub(super) fn conn(&mut self) -> &mut PgConnection {
        &mut *self.inner
    }
}

#[async_trait]
impl UnitOfWork for PostgresTx {
    async fn commit(self) -> StoreResult<()> {
        self.inner.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        self.inner.rollback().await?;
        Ok(())
    }
}
