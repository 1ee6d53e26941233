//! Kassa API server.
//!
//! Main entry point for the Kassa banking service.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::net::TcpListener;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kassa_api::{AppState, create_router};
use kassa_core::currency::RateTable;
use kassa_core::reports::{ReceiptWriter, StatementWriter};
use kassa_db::connect_with;
use kassa_db::repositories::{AccountRepository, AccrualOutcome};
use kassa_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kassa=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        home_bank_id: config.bank.home_bank_id,
        rates: RateTable::new(config.rates.clone()),
        lock_timeout: Duration::from_secs(config.database.lock_timeout_secs),
        receipts: Arc::new(ReceiptWriter::new(&config.reporting.receipts_dir)),
        statements: Arc::new(StatementWriter::new(&config.reporting.statements_dir)),
    };
    info!(
        home_bank_id = config.bank.home_bank_id,
        rates = config.rates.len(),
        "Bank policy configured"
    );

    // Interest accrual scheduler
    spawn_interest_scheduler(state.account_repository(), &config);

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Spawns the periodic interest task.
///
/// The engine's eligibility check is date-based only (last day of the
/// month), so the once-per-day discipline lives here: a day on which the
/// accrual committed is never accrued again, while a failed attempt is
/// retried on the next tick.
fn spawn_interest_scheduler(repository: AccountRepository, config: &AppConfig) {
    let rate = config.interest.rate;
    let tick = Duration::from_secs(config.interest.tick_secs);
    info!(%rate, tick_secs = config.interest.tick_secs, "Interest scheduler started");

    tokio::spawn(async move {
        let mut last_applied: Option<NaiveDate> = None;
        let mut interval = tokio::time::interval(tick);
        loop {
            interval.tick().await;
            let today = chrono::Local::now().date_naive();
            if last_applied == Some(today) {
                continue;
            }
            match repository.apply_monthly_interest(rate, today).await {
                Ok(AccrualOutcome::Applied { accounts }) => {
                    last_applied = Some(today);
                    info!(accounts, %rate, %today, "monthly interest applied");
                }
                Ok(AccrualOutcome::Skipped) => {
                    debug!(%today, "interest tick: not the last day of the month");
                }
                Err(err) => {
                    error!(error = %err, "interest accrual failed; will retry next tick");
                }
            }
        }
    });
}
