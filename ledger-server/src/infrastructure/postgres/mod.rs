//! PostgreSQL / CockroachDB ledger backend

mod account_ledger;
mod holding_ledger;
mod order_ledger;
mod schema;
mod store;

pub use account_ledger::PostgresAccountLedger;
pub use holding_ledger::PostgresHoldingLedger;
pub use order_ledger::PostgresOrderLedger;
pub use store::{PostgresLedgerStore, PostgresTx};

use crate::application::TradingEngine;
use std::sync::Arc;

pub type PostgresTradingEngine = TradingEngine<
    PostgresLedgerStore,
    PostgresAccountLedger,
    PostgresHoldingLedger,
    PostgresOrderLedger,
>;

impl PostgresTradingEngine {
    pub fn postgres(store: Arc<PostgresLedgerStore>) -> Self {
        TradingEngine::new(
            store,
            Arc::new(PostgresAccountLedger::new()),
            Arc::new(PostgresHoldingLedger::new()),
            Arc::new(PostgresOrderLedger::new()),
        )
    }
}
