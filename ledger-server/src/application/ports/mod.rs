mod account_ledger;
mod error;
mod holding_ledger;
mod ledger_store;
mod order_ledger;

pub use account_ledger::AccountLedger;
pub use error::{LedgerError, LedgerResult, StoreError, StoreResult};
pub use holding_ledger::HoldingLedger;
pub use ledger_store::{LedgerStore, UnitOfWork};
pub use order_ledger::OrderLedger;
