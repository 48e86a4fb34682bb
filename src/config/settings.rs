use serde::{Deserialize, Serialize};
use tracing::warn;

use super::validator::{
    validate_granularity_seconds, validate_http_url, validate_required, validate_timeout_seconds,
};
use crate::error::AppError;

pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_DATABASE_NAME: &str = "crypto_prices";
pub const DEFAULT_COLLECTION_NAME: &str = "bitcoin_usd";
pub const DEFAULT_COINBASE_PRODUCT_ID: &str = "BTC-USD";
pub const DEFAULT_COINBASE_GRANULARITY_SECONDS: u32 = 60;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub price_api: PriceApiSettings,
    pub coinbase: CoinbaseSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub uri: String,
    pub database_name: String,
    pub collection_name: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceApiSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

/// Secondary Coinbase candle source. Not read by the BTC/USD market-chart flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinbaseSettings {
    pub product_id: String,
    pub granularity_seconds: u32,
}

impl Default for PriceApiSettings {
    fn default() -> Self {
        PriceApiSettings {
            base_url: DEFAULT_PRICE_API_URL.to_string(),
            api_key: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl Default for CoinbaseSettings {
    fn default() -> Self {
        CoinbaseSettings {
            product_id: DEFAULT_COINBASE_PRODUCT_ID.to_string(),
            granularity_seconds: DEFAULT_COINBASE_GRANULARITY_SECONDS,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn new() -> Result<Self, AppError> {
        Self::from_environment(config::Environment::default())
    }

    /// Reads settings from the given environment source. Keys are matched
    /// case-insensitively (`MONGODB_URI` and `mongodb_uri` are the same key).
    pub fn from_environment(environment: config::Environment) -> Result<Self, AppError> {
        let source = config::Config::builder().add_source(environment).build()?;
        let lookup = |key: &str| source.get_string(key).ok();

        let uri = validate_required(lookup("mongodb_uri"), "MONGODB_URI")
            .map_err(|e| AppError::ConfigError(e.to_string()))?;

        let base_url = match lookup("coingecko_api_url").filter(|v| !v.trim().is_empty()) {
            Some(raw) => validate_http_url(raw.trim(), "COINGECKO_API_URL")
                .map_err(|e| AppError::ConfigError(e.to_string()))?
                .as_str()
                .trim_end_matches('/')
                .to_string(),
            None => DEFAULT_PRICE_API_URL.to_string(),
        };

        Ok(Settings {
            database: DatabaseSettings {
                uri,
                database_name: DEFAULT_DATABASE_NAME.to_string(),
                collection_name: DEFAULT_COLLECTION_NAME.to_string(),
                timeout_seconds: timeout_or_default(
                    lookup("mongodb_timeout_seconds"),
                    "MONGODB_TIMEOUT_SECONDS",
                ),
            },
            price_api: PriceApiSettings {
                base_url,
                api_key: lookup("coingecko_api_key").filter(|v| !v.trim().is_empty()),
                timeout_seconds: timeout_or_default(
                    lookup("http_timeout_seconds"),
                    "HTTP_TIMEOUT_SECONDS",
                ),
            },
            coinbase: CoinbaseSettings {
                product_id: lookup("coinbase_product_id")
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_COINBASE_PRODUCT_ID.to_string()),
                granularity_seconds: match lookup("coinbase_granularity_seconds") {
                    Some(raw) => validate_granularity_seconds(&raw).unwrap_or_else(|e| {
                        warn!(
                            "{}; using default of {} seconds",
                            e, DEFAULT_COINBASE_GRANULARITY_SECONDS
                        );
                        DEFAULT_COINBASE_GRANULARITY_SECONDS
                    }),
                    None => DEFAULT_COINBASE_GRANULARITY_SECONDS,
                },
            },
        })
    }
}

fn timeout_or_default(raw: Option<String>, field: &str) -> u64 {
    match raw {
        Some(raw) => validate_timeout_seconds(&raw, field).unwrap_or_else(|e| {
            warn!("{}; using default of {} seconds", e, DEFAULT_TIMEOUT_SECONDS);
            DEFAULT_TIMEOUT_SECONDS
        }),
        None => DEFAULT_TIMEOUT_SECONDS,
    }
}
