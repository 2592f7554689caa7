pub mod config;
pub mod memory;
pub mod postgres;

pub use config::{ConfigError, LedgerConfig, SeedConfig, StoreBackend};
pub use memory::{InMemoryLedgerStore, InMemoryTradingEngine};
pub use postgres::{PostgresLedgerStore, PostgresTradingEngine};
