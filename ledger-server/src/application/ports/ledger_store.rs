use super::StoreResult;
use async_trait::async_trait;

/// Transactional store holding the accounts, holdings and orders tables.
///
/// Every ledger read and write happens inside a [`UnitOfWork`] obtained from
/// [`LedgerStore::begin`].
#[async_trait]
pub trait LedgerStore: Send + Sync {
    type Tx: UnitOfWork;

    /// Open a transaction. Concurrent transactions that write rows another
    /// one has read or written fail to commit with `StoreError::Conflict`.
    async fn begin(&self) -> StoreResult<Self::Tx>;
}

/// An open store transaction.
///
/// Dropping a unit of work without calling [`UnitOfWork::commit`] rolls it
/// back, so early returns and abandoned futures never leak partial writes.
#[async_trait]
pub trait UnitOfWork: Send + Sized {
    /// Make every write of this transaction visible atomically.
    async fn commit(self) -> StoreResult<()>;

    /// Discard every write of this transaction.
    async fn rollback(self) -> StoreResult<()>;
}
