//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional (all have defaults relative to the working directory)
//! - `TIDEWATER_MATERIAL_RATES` - Materials rate sheet CSV (default: `data/material-rates.csv`)
//! - `TIDEWATER_BORDER_RATES` - Border multiplier CSV (default: `data/border-rates.csv`)
//! - `TIDEWATER_CATALOG` - Catalog records JSON (default: `data/catalog.json`)
//! - `TIDEWATER_ORDERS` - Confirmed orders JSON (default: `data/orders.json`)
//! - `TIDEWATER_CHARGES` - Gateway charge records JSON (default: `data/charges.json`)
//! - `TIDEWATER_PLATFORM_FEE_PCT` - Platform fee fraction (default: `0.03`)

use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

use tidewater_settlement::SettlementConfig;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Materials rate sheet (name, retail, wholesale, weight).
    pub material_rates: PathBuf,
    /// Border multiplier sheet (name, cost per linear foot).
    pub border_rates: PathBuf,
    /// Catalog records, keyed by SKU.
    pub catalog: PathBuf,
    /// Confirmed order records.
    pub orders: PathBuf,
    /// Gateway charge records, keyed by charge id.
    pub charges: PathBuf,
    /// Platform fee as a fraction of the pre-tax cart.
    pub platform_fee_pct: Decimal,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let platform_fee_raw = get_env_or_default("TIDEWATER_PLATFORM_FEE_PCT", "0.03");
        let platform_fee_pct = platform_fee_raw.parse::<Decimal>().map_err(|e| {
            ConfigError::InvalidEnvVar("TIDEWATER_PLATFORM_FEE_PCT".to_owned(), e.to_string())
        })?;

        Ok(Self {
            material_rates: get_path_or_default("TIDEWATER_MATERIAL_RATES", "data/material-rates.csv"),
            border_rates: get_path_or_default("TIDEWATER_BORDER_RATES", "data/border-rates.csv"),
            catalog: get_path_or_default("TIDEWATER_CATALOG", "data/catalog.json"),
            orders: get_path_or_default("TIDEWATER_ORDERS", "data/orders.json"),
            charges: get_path_or_default("TIDEWATER_CHARGES", "data/charges.json"),
            platform_fee_pct,
        })
    }

    /// The settlement configuration implied by the environment.
    #[must_use]
    pub fn settlement(&self) -> SettlementConfig {
        SettlementConfig {
            platform_fee_pct: self.platform_fee_pct,
            ..SettlementConfig::default()
        }
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Get a path-valued environment variable with a default value.
fn get_path_or_default(key: &str, default: &str) -> PathBuf {
    PathBuf::from(get_env_or_default(key, default))
}
