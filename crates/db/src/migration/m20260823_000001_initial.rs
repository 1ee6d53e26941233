//! Initial database migration.
//!
//! Creates the banking schema: banks, users, accounts, the append-only
//! transactions table, and seeds the home bank.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CORE TABLES
        // ============================================================
        db.execute_unprepared(BANKS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 3: SEED DATA
        // ============================================================
        db.execute_unprepared(SEED_HOME_BANK_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Transaction types (polarity: withdraw = sender only,
-- refill = receiver only, transfer = both sides set)
CREATE TYPE transaction_type AS ENUM (
    'withdraw',
    'refill',
    'transfer'
);
";

const BANKS_SQL: &str = r"
CREATE TABLE banks (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    active BOOLEAN NOT NULL DEFAULT true
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    surname VARCHAR(255) NOT NULL,
    birthdate DATE NOT NULL,
    active BOOLEAN NOT NULL DEFAULT true
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id BIGSERIAL PRIMARY KEY,
    number CHAR(16) NOT NULL UNIQUE CHECK (number ~ '^[0-9]{16}$'),
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (balance >= 0),
    currency VARCHAR(3) NOT NULL,
    user_id BIGINT NOT NULL REFERENCES users(id),
    bank_id BIGINT NOT NULL REFERENCES banks(id),
    created_date TIMESTAMPTZ NOT NULL DEFAULT now(),
    active BOOLEAN NOT NULL DEFAULT true
);

CREATE INDEX idx_accounts_bank ON accounts(bank_id) WHERE active = true;
CREATE INDEX idx_accounts_user ON accounts(user_id) WHERE active = true;
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id BIGSERIAL PRIMARY KEY,
    amount NUMERIC(19, 4) NOT NULL CHECK (amount > 0),
    type transaction_type NOT NULL,
    currency VARCHAR(3) NOT NULL,
    sender_account_id BIGINT REFERENCES accounts(id),
    receiver_account_id BIGINT REFERENCES accounts(id),
    created_date TIMESTAMPTZ NOT NULL DEFAULT now(),
    CHECK (sender_account_id IS NOT NULL OR receiver_account_id IS NOT NULL)
);

CREATE INDEX idx_transactions_sender_date
    ON transactions(sender_account_id, created_date);
CREATE INDEX idx_transactions_receiver_date
    ON transactions(receiver_account_id, created_date);
";

const SEED_HOME_BANK_SQL: &str = r"
-- ============================================================
-- SEED: Home bank (id 1 is the operator's own bank)
-- ============================================================
INSERT INTO banks (id, name) VALUES (1, 'Kassa')
ON CONFLICT (id) DO NOTHING;

SELECT setval('banks_id_seq', GREATEST((SELECT MAX(id) FROM banks), 1));
";

const DROP_ALL_SQL: &str = r"
-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TABLE IF EXISTS banks CASCADE;

-- Drop enums
DROP TYPE IF EXISTS transaction_type CASCADE;
";
