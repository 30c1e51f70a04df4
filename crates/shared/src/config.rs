//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger posting configuration.
    #[serde(default)]
    pub posting: PostingConfig,
    /// Invoice recalculation configuration.
    #[serde(default)]
    pub invoicing: InvoicingConfig,
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
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Posting engine configuration.
///
/// Governs the bounded retry loop around each atomic posting.
#[derive(Debug, Clone, Deserialize)]
pub struct PostingConfig {
    /// Maximum attempts for one posting (first try included).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed delay between attempts, in milliseconds.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// Upper bound for a single attempt, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    5
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Invoice recalculation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoicingConfig {
    /// Service charge per container on service invoices.
    #[serde(default = "default_service_charge_rate")]
    pub service_charge_rate: Decimal,
    /// Tax percentage applied to the service charge line.
    #[serde(default = "default_service_charge_tax_percent")]
    pub service_charge_tax_percent: Decimal,
}

fn default_service_charge_rate() -> Decimal {
    Decimal::ZERO
}

fn default_service_charge_tax_percent() -> Decimal {
    Decimal::ZERO
}

impl Default for InvoicingConfig {
    fn default() -> Self {
        Self {
            service_charge_rate: default_service_charge_rate(),
            service_charge_tax_percent: default_service_charge_tax_percent(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("LEDGERLINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
