//! Database layer for Kassa.
//!
//! This crate contains the `SeaORM` entities, migrations, and repositories
//! that persist accounts, banks, users, and the append-only transaction
//! log. Repositories sequence the decisions made by `kassa-core` inside
//! locked database transactions; no balance arithmetic happens here.

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod txn;

pub use repositories::{AccountRepository, BankRepository, TransactionRepository, UserRepository};

use kassa_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Creates a database connection from a bare URL.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Creates a pooled database connection from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(&config.url);
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections);
    Database::connect(options).await
}
