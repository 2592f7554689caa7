//! In-process transactional store.
//!
//! Concurrency control is optimistic. A transaction reads committed rows
//! directly, buffers its writes, and remembers the version of every row (and
//! every per-account holdings scan) it touched. Commit re-checks those versions
//! under the table lock: if any changed, the transaction fails with
//! [`StoreError::Conflict`] and nothing is applied. Otherwise all buffered
//! writes land atomically under a new commit sequence. The resulting schedules
//! are serializable.

use crate::application::ports::{LedgerStore, StoreError, StoreResult, UnitOfWork};
use crate::domain::{
    Account, AccountId, Holding, HoldingId, Money, NewOrder, Order, OrderId, Quantity, StockCode,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

type HoldingKey = (AccountId, StockCode);

/// Commit sequence of the last write to a row. 0 means never written.
type Version = u64;

#[derive(Debug, Clone)]
struct Versioned<T> {
    version: Version,
    row: T,
}

#[derive(Debug, Default)]
struct Tables {
    commit_seq: Version,
    account_seq: i64,
    holding_seq: i64,
    order_seq: i64,
    accounts: HashMap<AccountId, Versioned<Account>>,
    account_numbers: HashMap<String, AccountId>,
    /// Deleted holdings stay as `None` tombstones so re-inserts bump the version.
    holdings: HashMap<HoldingKey, Versioned<Option<Holding>>>,
    /// Last commit that changed any holding of the account.
    holding_scans: HashMap<AccountId, Version>,
    orders: HashMap<OrderId, Versioned<Order>>,
}

impl Tables {
    fn account_version(&self, id: AccountId) -> Version {
        self.accounts.get(&id).map_or(0, |v| v.version)
    }

    fn holding_version(&self, key: &HoldingKey) -> Version {
        self.holdings.get(key).map_or(0, |v| v.version)
    }

    fn scan_version(&self, account_id: AccountId) -> Version {
        self.holding_scans.get(&account_id).copied().unwrap_or(0)
    }

    fn order_version(&self, id: OrderId) -> Version {
        self.orders.get(&id).map_or(0, |v| v.version)
    }

    fn validate(&self, reads: &ReadSet) -> StoreResult<()> {
        let unchanged = reads
            .accounts
            .iter()
            .all(|(id, v)| self.account_version(*id) == *v)
            && reads
                .holdings
                .iter()
                .all(|(key, v)| self.holding_version(key) == *v)
            && reads
                .holding_scans
                .iter()
                .all(|(id, v)| self.scan_version(*id) == *v)
            && reads
                .orders
                .iter()
                .all(|(id, v)| self.order_version(*id) == *v);

        if unchanged {
            Ok(())
        } else {
            Err(StoreError::Conflict)
        }
    }

    fn apply(&mut self, writes: WriteSet) {
        self.commit_seq += 1;
        let version = self.commit_seq;

        for (id, row) in writes.accounts {
            self.accounts.insert(id, Versioned { version, row });
        }
        for (key, row) in writes.holdings {
            self.holding_scans.insert(key.0, version);
            self.holdings.insert(key, Versioned { version, row });
        }
        for (id, row) in writes.orders {
            self.orders.insert(id, Versioned { version, row });
        }
    }

    fn insert_account(&mut self, account_number: &str, balance: Money) -> StoreResult<AccountId> {
        if self.account_numbers.contains_key(account_number) {
            return Err(StoreError::Constraint(format!(
                "duplicate account_number {}",
                account_number
            )));
        }
        check_balance(balance)?;

        self.account_seq += 1;
        self.commit_seq += 1;
        let id = self.account_seq;
        let now = Utc::now();
        let account = Account {
            id,
            account_number: account_number.to_string(),
            balance,
            created_at: now,
            updated_at: now,
        };
        self.account_numbers.insert(account_number.to_string(), id);
        self.accounts.insert(
            id,
            Versioned {
                version: self.commit_seq,
                row: account,
            },
        );
        Ok(id)
    }
}

/// Row versions observed by a transaction, recorded on first access.
#[derive(Debug, Default)]
struct ReadSet {
    accounts: HashMap<AccountId, Version>,
    holdings: HashMap<HoldingKey, Version>,
    holding_scans: HashMap<AccountId, Version>,
    orders: HashMap<OrderId, Version>,
}

#[derive(Debug, Default)]
struct WriteSet {
    accounts: HashMap<AccountId, Account>,
    holdings: HashMap<HoldingKey, Option<Holding>>,
    orders: HashMap<OrderId, Order>,
}

impl WriteSet {
    fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.holdings.is_empty() && self.orders.is_empty()
    }
}

fn check_balance(balance: Money) -> StoreResult<()> {
    if balance < Decimal::ZERO {
        return Err(StoreError::Constraint(format!(
            "accounts.balance must be >= 0, got {}",
            balance
        )));
    }
    Ok(())
}

/// In-memory ledger store
///
/// Cloning shares the same tables.
#[derive(Clone, Default)]
pub struct InMemoryLedgerStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account outside of any transaction.
    pub fn seed_account(&self, account_number: &str, balance: Money) -> StoreResult<AccountId> {
        self.tables.lock().insert_account(account_number, balance)
    }

    /// Add shares to a position outside of any transaction.
    pub fn seed_holding(
        &self,
        account_id: AccountId,
        stock_code: &StockCode,
        quantity: Quantity,
    ) -> StoreResult<()> {
        let mut tx = InMemoryTx::new(Arc::clone(&self.tables));
        tx.add_to_holding(account_id, stock_code, quantity)?;
        tx.commit_now()
    }

    /// Insert an order row as-is, e.g. one already partially executed elsewhere.
    pub fn seed_order(&self, order: NewOrder) -> StoreResult<Order> {
        let mut tx = InMemoryTx::new(Arc::clone(&self.tables));
        let order = tx.insert_order(order)?;
        tx.commit_now()?;
        Ok(order)
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    type Tx = InMemoryTx;

    async fn begin(&self) -> StoreResult<InMemoryTx> {
        Ok(InMemoryTx::new(Arc::clone(&self.tables)))
    }
}

/// A transaction against [`InMemoryLedgerStore`].
pub struct InMemoryTx {
    tables: Arc<Mutex<Tables>>,
    reads: ReadSet,
    writes: WriteSet,
    open: bool,
}

impl InMemoryTx {
    fn new(tables: Arc<Mutex<Tables>>) -> Self {
        Self {
            tables,
            reads: ReadSet::default(),
            writes: WriteSet::default(),
            open: true,
        }
    }

    fn commit_now(&mut self) -> StoreResult<()> {
        let writes = std::mem::take(&mut self.writes);
        let mut tables = self.tables.lock();
        tables.validate(&self.reads)?;
        tables.apply(writes);
        self.open = false;
        Ok(())
    }

    // ========== Accounts ==========

    pub fn account(&mut self, id: AccountId) -> Option<Account> {
        if let Some(account) = self.writes.accounts.get(&id) {
            return Some(account.clone());
        }
        let tables = self.tables.lock();
        let committed = tables.accounts.get(&id);
        self.reads
            .accounts
            .entry(id)
            .or_insert(committed.map_or(0, |v| v.version));
        committed.map(|v| v.row.clone())
    }

    pub fn put_account(&mut self, account: Account) -> StoreResult<()> {
        check_balance(account.balance)?;
        if !self.writes.accounts.contains_key(&account.id) {
            let version = self.tables.lock().account_version(account.id);
            self.reads.accounts.entry(account.id).or_insert(version);
        }
        self.writes.accounts.insert(account.id, account);
        Ok(())
    }

    fn account_exists(&self, id: AccountId) -> bool {
        // Accounts are never deleted, so existence needs no read tracking
        self.writes.accounts.contains_key(&id) || self.tables.lock().accounts.contains_key(&id)
    }

    // ========== Holdings ==========

    pub fn holding(&mut self, account_id: AccountId, stock_code: &StockCode) -> Option<Holding> {
        let key = (account_id, stock_code.clone());
        if let Some(row) = self.writes.holdings.get(&key) {
            return row.clone();
        }
        let tables = self.tables.lock();
        let committed = tables.holdings.get(&key);
        let version = committed.map_or(0, |v| v.version);
        let row = committed.and_then(|v| v.row.clone());
        drop(tables);
        self.reads.holdings.entry(key).or_insert(version);
        row
    }

    /// All positions of an account, ordered by holding id.
    pub fn holdings_of(&mut self, account_id: AccountId) -> Vec<Holding> {
        let mut rows: HashMap<StockCode, Holding> = {
            let tables = self.tables.lock();
            self.reads
                .holding_scans
                .entry(account_id)
                .or_insert(tables.scan_version(account_id));
            tables
                .holdings
                .iter()
                .filter(|((owner, _), _)| *owner == account_id)
                .filter_map(|((_, code), v)| v.row.clone().map(|h| (code.clone(), h)))
                .collect()
        };

        for ((owner, code), row) in &self.writes.holdings {
            if *owner != account_id {
                continue;
            }
            match row {
                Some(holding) => {
                    rows.insert(code.clone(), holding.clone());
                }
                None => {
                    rows.remove(code);
                }
            }
        }

        let mut holdings: Vec<Holding> = rows.into_values().collect();
        holdings.sort_by_key(|h| h.id);
        holdings
    }

    /// Upsert a position; quantities of zero or less delete it.
    pub fn put_holding_quantity(
        &mut self,
        account_id: AccountId,
        stock_code: &StockCode,
        quantity: Quantity,
    ) -> StoreResult<()> {
        if quantity <= 0 {
            let key = (account_id, stock_code.clone());
            self.track_holding_write(&key);
            self.writes.holdings.insert(key, None);
            return Ok(());
        }

        let now = Utc::now();
        let holding = match self.holding(account_id, stock_code) {
            Some(existing) => Holding {
                quantity,
                updated_at: now,
                ..existing
            },
            None => self.new_holding(account_id, stock_code, quantity)?,
        };
        self.writes
            .holdings
            .insert((account_id, stock_code.clone()), Some(holding));
        Ok(())
    }

    /// Insert a position or add to the existing one.
    pub fn add_to_holding(
        &mut self,
        account_id: AccountId,
        stock_code: &StockCode,
        quantity: Quantity,
    ) -> StoreResult<()> {
        let current = self.holding(account_id, stock_code).map_or(0, |h| h.quantity);
        let total = current.checked_add(quantity).ok_or_else(|| {
            StoreError::Constraint(format!(
                "holdings.quantity overflows adding {} to {}",
                quantity, current
            ))
        })?;
        if total <= 0 {
            return Err(StoreError::Constraint(format!(
                "holdings.quantity must be > 0, got {}",
                total
            )));
        }
        self.put_holding_quantity(account_id, stock_code, total)
    }

    fn new_holding(
        &mut self,
        account_id: AccountId,
        stock_code: &StockCode,
        quantity: Quantity,
    ) -> StoreResult<Holding> {
        if !self.account_exists(account_id) {
            return Err(StoreError::Constraint(format!(
                "holdings.account_id references missing account {}",
                account_id
            )));
        }
        let id: HoldingId = {
            let mut tables = self.tables.lock();
            tables.holding_seq += 1;
            tables.holding_seq
        };
        let now = Utc::now();
        Ok(Holding {
            id,
            account_id,
            stock_code: stock_code.clone(),
            quantity,
            created_at: now,
            updated_at: now,
        })
    }

    fn track_holding_write(&mut self, key: &HoldingKey) {
        if !self.writes.holdings.contains_key(key) && !self.reads.holdings.contains_key(key) {
            let version = self.tables.lock().holding_version(key);
            self.reads.holdings.insert(key.clone(), version);
        }
    }

    // ========== Orders ==========

    pub fn order(&mut self, id: OrderId) -> Option<Order> {
        if let Some(order) = self.writes.orders.get(&id) {
            return Some(order.clone());
        }
        let tables = self.tables.lock();
        let committed = tables.orders.get(&id);
        self.reads
            .orders
            .entry(id)
            .or_insert(committed.map_or(0, |v| v.version));
        committed.map(|v| v.row.clone())
    }

    pub fn insert_order(&mut self, order: NewOrder) -> StoreResult<Order> {
        if !self.account_exists(order.account_id) {
            return Err(StoreError::Constraint(format!(
                "orders.account_id references missing account {}",
                order.account_id
            )));
        }
        if order.quantity <= 0 || order.filled_quantity < 0 || order.filled_quantity > order.quantity
        {
            return Err(StoreError::Constraint(format!(
                "orders quantity {} / filled {} out of range",
                order.quantity, order.filled_quantity
            )));
        }
        let id: OrderId = {
            let mut tables = self.tables.lock();
            tables.order_seq += 1;
            tables.order_seq
        };
        let order = order.into_order(id, Utc::now());
        self.writes.orders.insert(id, order.clone());
        Ok(order)
    }

    pub fn put_order(&mut self, order: Order) {
        if !self.writes.orders.contains_key(&order.id) {
            let version = self.tables.lock().order_version(order.id);
            self.reads.orders.entry(order.id).or_insert(version);
        }
        self.writes.orders.insert(order.id, order);
    }
}

#[async_trait]
impl UnitOfWork for InMemoryTx {
    async fn commit(mut self) -> StoreResult<()> {
        self.commit_now()
    }

    async fn rollback(mut self) -> StoreResult<()> {
        self.open = false;
        self.writes = WriteSet::default();
        Ok(())
    }
}

impl Drop for InMemoryTx {
    fn drop(&mut self) {
        if self.open && !self.writes.is_empty() {
            debug!("discarding writes of an uncommitted transaction");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn stock(code: &str) -> StockCode {
        StockCode::new(code).unwrap()
    }

    #[tokio::test]
    async fn test_commit_makes_writes_visible() {
        let store = InMemoryLedgerStore::new();
        let id = store.seed_account("AC001", dec!(100)).unwrap();

        let mut tx = store.begin().await.unwrap();
        let mut account = tx.account(id).unwrap();
        account.balance = dec!(40);
        tx.put_account(account).unwrap();
        // Read-your-writes
        assert_eq!(tx.account(id).unwrap().balance, dec!(40));
        tx.commit().await.unwrap();

        let mut reader = store.begin().await.unwrap();
        assert_eq!(reader.account(id).unwrap().balance, dec!(40));
    }

    #[tokio::test]
    async fn test_drop_discards_writes() {
        let store = InMemoryLedgerStore::new();
        let id = store.seed_account("AC001", dec!(100)).unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            let mut account = tx.account(id).unwrap();
            account.balance = dec!(0);
            tx.put_account(account).unwrap();
            tx.put_holding_quantity(id, &stock("STOCK01"), 10).unwrap();
        }

        let mut reader = store.begin().await.unwrap();
        assert_eq!(reader.account(id).unwrap().balance, dec!(100));
        assert!(reader.holding(id, &stock("STOCK01")).is_none());
    }

    #[tokio::test]
    async fn test_conflicting_writers_second_commit_fails() {
        let store = InMemoryLedgerStore::new();
        let id = store.seed_account("AC001", dec!(100)).unwrap();

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();

        let mut a = first.account(id).unwrap();
        let mut b = second.account(id).unwrap();
        a.balance -= dec!(80);
        b.balance -= dec!(80);
        first.put_account(a).unwrap();
        second.put_account(b).unwrap();

        first.commit().await.unwrap();
        assert_eq!(second.commit().await, Err(StoreError::Conflict));

        let mut reader = store.begin().await.unwrap();
        assert_eq!(reader.account(id).unwrap().balance, dec!(20));
    }

    #[tokio::test]
    async fn test_read_of_absent_holding_conflicts_with_insert() {
        let store = InMemoryLedgerStore::new();
        let id = store.seed_account("AC001", dec!(0)).unwrap();

        let mut reader = store.begin().await.unwrap();
        assert!(reader.holding(id, &stock("STOCK01")).is_none());
        reader.put_holding_quantity(id, &stock("STOCK01"), 5).unwrap();

        store.seed_holding(id, &stock("STOCK01"), 3).unwrap();

        assert_eq!(reader.commit().await, Err(StoreError::Conflict));
    }

    #[tokio::test]
    async fn test_scan_conflicts_with_new_position() {
        let store = InMemoryLedgerStore::new();
        let id = store.seed_account("AC001", dec!(0)).unwrap();

        let mut scanner = store.begin().await.unwrap();
        assert!(scanner.holdings_of(id).is_empty());
        let mut account = scanner.account(id).unwrap();
        account.balance = dec!(1);
        scanner.put_account(account).unwrap();

        store.seed_holding(id, &stock("STOCK02"), 1).unwrap();

        assert_eq!(scanner.commit().await, Err(StoreError::Conflict));
    }

    #[tokio::test]
    async fn test_disjoint_accounts_do_not_conflict() {
        let store = InMemoryLedgerStore::new();
        let a = store.seed_account("AC001", dec!(10)).unwrap();
        let b = store.seed_account("AC002", dec!(10)).unwrap();

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();
        let mut acc_a = first.account(a).unwrap();
        let mut acc_b = second.account(b).unwrap();
        acc_a.balance = dec!(1);
        acc_b.balance = dec!(2);
        first.put_account(acc_a).unwrap();
        second.put_account(acc_b).unwrap();

        first.commit().await.unwrap();
        second.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_quantity_deletes_and_is_idempotent() {
        let store = InMemoryLedgerStore::new();
        let id = store.seed_account("AC001", dec!(0)).unwrap();
        store.seed_holding(id, &stock("STOCK01"), 100).unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.put_holding_quantity(id, &stock("STOCK01"), 0).unwrap();
        tx.put_holding_quantity(id, &stock("STOCK01"), -3).unwrap();
        assert!(tx.holding(id, &stock("STOCK01")).is_none());
        assert!(tx.holdings_of(id).is_empty());
        tx.commit().await.unwrap();

        let mut reader = store.begin().await.unwrap();
        assert!(reader.holding(id, &stock("STOCK01")).is_none());
    }

    #[tokio::test]
    async fn test_holdings_listed_in_id_order() {
        let store = InMemoryLedgerStore::new();
        let id = store.seed_account("AC001", dec!(0)).unwrap();
        store.seed_holding(id, &stock("ZZZ"), 1).unwrap();
        store.seed_holding(id, &stock("AAA"), 2).unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.put_holding_quantity(id, &stock("MMM"), 3).unwrap();
        let codes: Vec<String> = tx
            .holdings_of(id)
            .into_iter()
            .map(|h| h.stock_code.to_string())
            .collect();
        assert_eq!(codes, vec!["ZZZ", "AAA", "MMM"]);
    }

    #[test]
    fn test_constraints() {
        let store = InMemoryLedgerStore::new();
        let id = store.seed_account("AC001", dec!(5)).unwrap();

        assert!(matches!(
            store.seed_account("AC001", dec!(1)),
            Err(StoreError::Constraint(_))
        ));
        assert!(matches!(
            store.seed_account("AC002", dec!(-1)),
            Err(StoreError::Constraint(_))
        ));
        assert!(matches!(
            store.seed_holding(999, &stock("STOCK01"), 1),
            Err(StoreError::Constraint(_))
        ));
        assert!(matches!(
            store.seed_holding(id, &stock("STOCK01"), 0),
            Err(StoreError::Constraint(_))
        ));
    }

    #[tokio::test]
    async fn test_accumulating_past_i64_max_is_a_constraint_error() {
        let store = InMemoryLedgerStore::new();
        let id = store.seed_account("AC001", dec!(0)).unwrap();
        store.seed_holding(id, &stock("STOCK01"), i64::MAX - 1).unwrap();

        assert!(matches!(
            store.seed_holding(id, &stock("STOCK01"), 2),
            Err(StoreError::Constraint(_))
        ));

        let mut reader = store.begin().await.unwrap();
        assert_eq!(
            reader.holding(id, &stock("STOCK01")).unwrap().quantity,
            i64::MAX - 1
        );
    }
}
