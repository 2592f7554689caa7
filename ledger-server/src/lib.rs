//! Mini Ledger Server
//!
//! Keeps per-account cash balances and stock holdings, and records buy/sell
//! orders against them behind a small JSON API.
//!
//! # Architecture
//!
//! The crate follows Clean Architecture:
//!
//! - **Domain**: value objects and entities from `ledger-core`, plus order validation
//! - **Application**: the [`TradingEngine`] and the store/ledger ports it drives
//! - **Infrastructure**: in-memory and PostgreSQL stores, configuration loading
//! - **Presentation**: REST handlers (axum)
//!
//! # Consistency
//!
//! Placing an order reserves its funds (BUY) or shares (SELL) in the same
//! transaction that inserts the order; canceling returns the unfilled part in
//! the same transaction that marks the order canceled. Both stores run those
//! transactions serializably, so concurrent requests can never overdraw a
//! balance or sell the same shares twice. A request that loses a race fails
//! with a retryable conflict (HTTP 409).
//!
//! # Example
//!
//! ```ignore
//! use ledger_server::{LedgerConfig, LedgerServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = LedgerServer::from_config(LedgerConfig::default()).await.unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::{
    BalanceView, CreateOrderCommand, HoldingView, LedgerError, LedgerResult, StoreError,
    TradingEngine, TradingService,
};
pub use domain::{
    Account, AccountId, Direction, Holding, Money, Order, OrderId, OrderStatus, OrderType,
    Quantity, StockCode, ValidationError,
};
pub use infrastructure::{
    ConfigError, InMemoryLedgerStore, InMemoryTradingEngine, LedgerConfig, PostgresLedgerStore,
    PostgresTradingEngine, SeedConfig, StoreBackend,
};

// Re-export port traits for integration tests
pub use application::ports::{AccountLedger, HoldingLedger, LedgerStore, OrderLedger, UnitOfWork};

pub use presentation::{ApiError, AppState, create_router};

use axum::Router;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to initialise store: {0}")]
    Store(#[from] StoreError),
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

enum Engine {
    Memory(InMemoryTradingEngine),
    Postgres(PostgresTradingEngine),
}

/// The ledger HTTP server
pub struct LedgerServer {
    pub config: LedgerConfig,
    engine: Engine,
}

impl LedgerServer {
    /// Open the configured store, create tables if needed and load seed data.
    pub async fn from_config(config: LedgerConfig) -> Result<Self, ServerError> {
        config.validate()?;

        let engine = match config.store.backend {
            StoreBackend::Memory => {
                let store = Arc::new(InMemoryLedgerStore::new());
                store.apply_seed(&config.seed)?;
                Engine::Memory(InMemoryTradingEngine::in_memory(store))
            }
            StoreBackend::Postgres => {
                let store = PostgresLedgerStore::connect(&config.store).await?;
                if config.store.run_migrations {
                    store.migrate().await?;
                }
                store.apply_seed(&config.seed).await?;
                Engine::Postgres(PostgresTradingEngine::postgres(Arc::new(store)))
            }
        };

        info!(
            backend = %config.store.backend,
            seed_accounts = config.seed.accounts.len(),
            "ledger store ready"
        );

        Ok(LedgerServer { config, engine })
    }

    /// Create the REST API router
    pub fn router(&self) -> Router {
        match &self.engine {
            Engine::Memory(engine) => create_router(Arc::new(AppState::new(Arc::new(
                engine.clone(),
            )))),
            Engine::Postgres(engine) => create_router(Arc::new(AppState::new(Arc::new(
                engine.clone(),
            )))),
        }
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.bind_address();
        let router = self.router();

        let listener = TcpListener::bind(&addr).await?;
        info!("Ledger server listening on {}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Ledger server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
