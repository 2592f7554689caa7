//! Configuration loading for the ledger server
//!
//! A JSON file describes:
//! - Server bind address
//! - Storage backend (in-process or PostgreSQL/CockroachDB)
//! - Seed accounts and their initial holdings
//!
//! Every field has a default, so `{}` is a valid configuration. Environment
//! variables override the file (see [`LedgerConfig::apply_env`]).

use crate::domain::{Money, OrderValidator, Quantity, StockCode};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    /// Rows inserted at startup
    #[serde(default)]
    pub seed: SeedConfig,
}

impl LedgerConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `HOST`, `PORT`/`HTTP_PORT`, `DATABASE_URL` and `LEDGER_STORE`
    /// from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Same as [`apply_env`](Self::apply_env) with an injectable lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }

        // PORT wins over HTTP_PORT when both are set
        if let Some(port) = lookup("PORT").or_else(|| lookup("HTTP_PORT")) {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("invalid port: {}", port)))?;
        }

        if let Some(url) = lookup("DATABASE_URL") {
            self.store.database_url = url;
        }

        if let Some(backend) = lookup("LEDGER_STORE") {
            self.store.backend = backend.parse()?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "store.max_connections must be at least 1".to_string(),
            ));
        }
        if self.store.backend == StoreBackend::Postgres && self.store.database_url.is_empty() {
            return Err(ConfigError::Invalid(
                "store.database_url is required for the postgres backend".to_string(),
            ));
        }
        self.seed.validate()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Postgres => "postgres",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "postgres" | "postgresql" | "cockroach" => Ok(StoreBackend::Postgres),
            other => Err(ConfigError::Invalid(format!(
                "unknown store backend '{}' (expected memory or postgres)",
                other
            ))),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Create tables on startup (postgres only)
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_database_url() -> String {
    "postgresql://root@localhost:26257/mini_ledger?sslmode=disable".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_run_migrations() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            run_migrations: default_run_migrations(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub accounts: Vec<SeedAccount>,
}

impl Default for SeedConfig {
    /// One demo account, `AC001`, with 1,000,000 in cash and 100 `STOCK01`.
    fn default() -> Self {
        Self {
            accounts: vec![SeedAccount {
                account_number: "AC001".to_string(),
                balance: dec!(1000000.00),
                holdings: StockCode::new("STOCK01")
                    .into_iter()
                    .map(|stock_code| SeedHolding {
                        stock_code,
                        quantity: 100,
                    })
                    .collect(),
            }],
        }
    }
}

impl SeedConfig {
    pub fn empty() -> Self {
        Self {
            accounts: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut numbers = HashSet::new();

        for account in &self.accounts {
            if account.account_number.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "seed account_number must not be empty".to_string(),
                ));
            }
            if !numbers.insert(account.account_number.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate seed account_number {}",
                    account.account_number
                )));
            }
            OrderValidator::validate_balance(account.balance).map_err(|e| {
                ConfigError::Invalid(format!("account {}: {}", account.account_number, e))
            })?;

            let mut codes = HashSet::new();
            for holding in &account.holdings {
                if holding.quantity <= 0 {
                    return Err(ConfigError::Invalid(format!(
                        "account {}: holding {} quantity must be positive",
                        account.account_number, holding.stock_code
                    )));
                }
                if !codes.insert(&holding.stock_code) {
                    return Err(ConfigError::Invalid(format!(
                        "account {}: duplicate holding {}",
                        account.account_number, holding.stock_code
                    )));
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedAccount {
    pub account_number: String,
    pub balance: Money,
    #[serde(default)]
    pub holdings: Vec<SeedHolding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedHolding {
    pub stock_code: StockCode,
    pub quantity: Quantity,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}
