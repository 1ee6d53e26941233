//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for banks, clients, and accounts
//! - Money movement endpoints backed by `kassa-db` repositories
//! - Check and statement documents for completed operations

pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use kassa_core::currency::RateTable;
use kassa_core::reports::{ReceiptWriter, StatementWriter};
use kassa_db::{AccountRepository, BankRepository, TransactionRepository, UserRepository};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Identifier of the bank this instance serves.
    pub home_bank_id: i64,
    /// Configured exchange rates for cross-currency transfers.
    pub rates: RateTable,
    /// How long a money movement may wait on a locked row.
    pub lock_timeout: Duration,
    /// Writer for banking checks.
    pub receipts: Arc<ReceiptWriter>,
    /// Writer for account and money statements.
    pub statements: Arc<StatementWriter>,
}

impl AppState {
    /// Builds an account repository wired to this instance's bank policy.
    #[must_use]
    pub fn account_repository(&self) -> AccountRepository {
        AccountRepository::new(
            (*self.db).clone(),
            self.home_bank_id,
            self.rates.clone(),
            self.lock_timeout,
        )
    }

    /// Builds a bank repository.
    #[must_use]
    pub fn bank_repository(&self) -> BankRepository {
        BankRepository::new((*self.db).clone(), self.home_bank_id, self.lock_timeout)
    }

    /// Builds a user repository.
    #[must_use]
    pub fn user_repository(&self) -> UserRepository {
        UserRepository::new((*self.db).clone(), self.home_bank_id, self.lock_timeout)
    }

    /// Builds a read-only transaction history repository.
    #[must_use]
    pub fn transaction_repository(&self) -> TransactionRepository {
        TransactionRepository::new((*self.db).clone())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
