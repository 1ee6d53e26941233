//! Application configuration management.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Home-bank policy configuration.
    #[serde(default)]
    pub bank: BankConfig,
    /// Monthly interest accrual configuration.
    #[serde(default)]
    pub interest: InterestConfig,
    /// Exchange rates keyed by ordered currency pair, e.g. `USDEUR = "0.90"`.
    ///
    /// Pairs are directional: configuring `USDEUR` does not imply `EURUSD`.
    #[serde(default)]
    pub rates: HashMap<String, Decimal>,
    /// Receipt and statement output configuration.
    #[serde(default)]
    pub reporting: ReportingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Upper bound on row-lock waits inside a mutating transaction, in seconds.
    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_lock_timeout_secs() -> u64 {
    5
}

/// Home-bank policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BankConfig {
    /// Id of the operator's own bank. Only accounts of this bank may be
    /// directly withdrawn from, deposited into, or deleted.
    #[serde(default = "default_home_bank_id")]
    pub home_bank_id: i64,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            home_bank_id: default_home_bank_id(),
        }
    }
}

fn default_home_bank_id() -> i64 {
    1
}

/// Monthly interest accrual configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InterestConfig {
    /// Monthly rate as a fraction, e.g. `0.01` for 1% per month.
    #[serde(default = "default_interest_rate")]
    pub rate: Decimal,
    /// Scheduler tick interval in seconds.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

impl Default for InterestConfig {
    fn default() -> Self {
        Self {
            rate: default_interest_rate(),
            tick_secs: default_tick_secs(),
        }
    }
}

fn default_interest_rate() -> Decimal {
    // 1% per month
    Decimal::new(1, 2)
}

fn default_tick_secs() -> u64 {
    30
}

/// Receipt and statement output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    /// Directory receipts are written into.
    #[serde(default = "default_receipts_dir")]
    pub receipts_dir: String,
    /// Directory statements are written into.
    #[serde(default = "default_statements_dir")]
    pub statements_dir: String,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            receipts_dir: default_receipts_dir(),
            statements_dir: default_statements_dir(),
        }
    }
}

fn default_receipts_dir() -> String {
    "receipts".to_string()
}

fn default_statements_dir() -> String {
    "statements".to_string()
}

impl AppConfig {
    /// Loads configuration from config files and the environment.
    ///
    /// Sources, later overriding earlier: `config/default`,
    /// `config/{RUN_MODE}` (default `development`), then `KASSA`-prefixed
    /// environment variables with `__` as the section separator
    /// (e.g. `KASSA__DATABASE__URL`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or deserialized.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("KASSA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
