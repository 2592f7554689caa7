//! Table definitions, applied in order on startup.
//!
//! Statements are idempotent so they can run against an existing database.
//! The SQL dialect is the common subset of PostgreSQL and CockroachDB.

pub(super) const MIGRATIONS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS accounts (
        id BIGSERIAL PRIMARY KEY,
        account_number TEXT NOT NULL UNIQUE,
        balance DECIMAL(15, 2) NOT NULL DEFAULT 0 CHECK (balance >= 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS holdings (
        id BIGSERIAL PRIMARY KEY,
        account_id BIGINT NOT NULL REFERENCES accounts (id),
        stock_code TEXT NOT NULL,
        quantity BIGINT NOT NULL CHECK (quantity > 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        UNIQUE (account_id, stock_code)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS orders (
        id BIGSERIAL PRIMARY KEY,
        account_id BIGINT NOT NULL REFERENCES accounts (id),
        stock_code TEXT NOT NULL,
        type TEXT NOT NULL CHECK (type IN ('MARKET', 'LIMIT')),
        direction TEXT NOT NULL CHECK (direction IN ('BUY', 'SELL')),
        quantity BIGINT NOT NULL CHECK (quantity > 0),
        price DECIMAL(15, 2) NOT NULL CHECK (price > 0),
        filled_quantity BIGINT NOT NULL DEFAULT 0
            CHECK (filled_quantity >= 0 AND filled_quantity <= quantity),
        status TEXT NOT NULL CHECK (status IN ('PENDING', 'PARTIAL', 'FILLED', 'CANCELED')),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_orders_account_id ON orders (account_id)",
];

pub(super) const INSERT_SEED_ACCOUNT: &str = "INSERT INTO accounts (account_number, balance) \
     VALUES ($1, $2) ON CONFLICT (account_number) DO NOTHING";

pub(super) const SELECT_ACCOUNT_ID: &str = "SELECT id FROM accounts WHERE account_number = $1";

pub(super) const INSERT_SEED_HOLDING: &str = "INSERT INTO holdings (account_id, stock_code, quantity) \
     VALUES ($1, $2, $3) ON CONFLICT (account_id, stock_code) DO NOTHING";
