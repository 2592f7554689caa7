//! In-process ledger backend
//!
//! Used by default and by the test suites.

mod account_ledger;
mod holding_ledger;
mod order_ledger;
mod store;

pub use account_ledger::InMemoryAccountLedger;
pub use holding_ledger::InMemoryHoldingLedger;
pub use order_ledger::InMemoryOrderLedger;
pub use store::{InMemoryLedgerStore, InMemoryTx};

use crate::application::TradingEngine;
use crate::application::ports::StoreResult;
use crate::infrastructure::config::SeedConfig;
use std::sync::Arc;
use tracing::info;

pub type InMemoryTradingEngine = TradingEngine<
    InMemoryLedgerStore,
    InMemoryAccountLedger,
    InMemoryHoldingLedger,
    InMemoryOrderLedger,
>;

impl InMemoryTradingEngine {
    pub fn in_memory(store: Arc<InMemoryLedgerStore>) -> Self {
        TradingEngine::new(
            store,
            Arc::new(InMemoryAccountLedger::new()),
            Arc::new(InMemoryHoldingLedger::new()),
            Arc::new(InMemoryOrderLedger::new()),
        )
    }
}

impl InMemoryLedgerStore {
    /// Load seed accounts and positions into an empty store.
    pub fn apply_seed(&self, seed: &SeedConfig) -> StoreResult<()> {
        for account in &seed.accounts {
            let id = self.seed_account(&account.account_number, account.balance)?;
            for holding in &account.holdings {
                self.seed_holding(id, &holding.stock_code, holding.quantity)?;
            }
            info!(
                account_id = id,
                account_number = %account.account_number,
                balance = %account.balance,
                holdings = account.holdings.len(),
                "seeded account"
            );
        }
        Ok(())
    }
}
