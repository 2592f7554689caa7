pub mod ports;
pub mod trading_engine;

pub use ports::{
    AccountLedger, HoldingLedger, LedgerError, LedgerResult, LedgerStore, OrderLedger,
    StoreError, StoreResult, UnitOfWork,
};
pub use trading_engine::{
    BalanceView, CreateOrderCommand, HoldingView, TradingEngine, TradingService,
};
