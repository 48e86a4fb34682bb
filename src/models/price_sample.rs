use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::DatabaseSettings;

pub const BTC_USD: &str = "BTC/USD";

/// One price point. `timestamp` is epoch milliseconds and is the unique key
/// of the sample within its collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: i64,
    pub price: Decimal,
    pub currency_pair: String,
}

impl PriceSample {
    pub fn new(timestamp: i64, price: Decimal) -> Self {
        Self {
            timestamp,
            price,
            currency_pair: BTC_USD.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    /// 15-minute candles.
    Fine,
    /// Whatever the API returns without an explicit interval (hourly for 2-90 days).
    Coarse,
}

impl Granularity {
    /// Value of the `interval` query parameter, if one is sent.
    pub fn interval_param(&self) -> Option<&'static str> {
        match self {
            Granularity::Fine => Some("15m"),
            Granularity::Coarse => None,
        }
    }

    pub fn downgrade(&self) -> Option<Granularity> {
        match self {
            Granularity::Fine => Some(Granularity::Coarse),
            Granularity::Coarse => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Granularity::Fine => "15-minute",
            Granularity::Coarse => "default (hourly)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub asset: String,
    pub vs_currency: String,
    pub days: u32,
    pub granularity: Granularity,
}

impl FetchRequest {
    pub fn new(asset: &str, vs_currency: &str, days: u32) -> Self {
        Self {
            asset: asset.to_string(),
            vs_currency: vs_currency.to_string(),
            days,
            granularity: Granularity::Fine,
        }
    }

    /// The same request at the next coarser granularity, if there is one.
    pub fn downgraded(&self) -> Option<FetchRequest> {
        self.granularity.downgrade().map(|granularity| FetchRequest {
            granularity,
            ..self.clone()
        })
    }

    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("vs_currency", self.vs_currency.clone()),
            ("days", self.days.to_string()),
        ];
        if let Some(interval) = self.granularity.interval_param() {
            params.push(("interval", interval.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceTarget {
    pub database_name: String,
    pub collection_name: String,
}

impl From<&DatabaseSettings> for PersistenceTarget {
    fn from(settings: &DatabaseSettings) -> Self {
        Self {
            database_name: settings.database_name.clone(),
            collection_name: settings.collection_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fine_request_carries_interval() {
        let request = FetchRequest::new("bitcoin", "usd", 5);
        assert_eq!(request.granularity, Granularity::Fine);
        assert_eq!(
            request.query_params(),
            vec![
                ("vs_currency", "usd".to_string()),
                ("days", "5".to_string()),
                ("interval", "15m".to_string()),
            ]
        );
    }

    #[test]
    fn test_downgrade_happens_once() {
        let fine = FetchRequest::new("bitcoin", "usd", 5);
        let coarse = fine.downgraded().unwrap();

        assert_eq!(coarse.granularity, Granularity::Coarse);
        assert_eq!(coarse.asset, "bitcoin");
        assert!(coarse.query_params().iter().all(|(key, _)| *key != "interval"));
        assert!(coarse.downgraded().is_none());
    }

    #[test]
    fn test_target_follows_database_settings() {
        let settings = DatabaseSettings {
            uri: "mongodb://localhost:27017".to_string(),
            database_name: "crypto_prices".to_string(),
            collection_name: "bitcoin_usd".to_string(),
            timeout_seconds: 10,
        };

        assert_eq!(
            PersistenceTarget::from(&settings),
            PersistenceTarget {
                database_name: "crypto_prices".to_string(),
                collection_name: "bitcoin_usd".to_string(),
            }
        );
    }

    #[test]
    fn test_sample_defaults_to_btc_usd() {
        let sample = PriceSample::new(1609459200000, Decimal::new(30000, 0));
        assert_eq!(sample.currency_pair, "BTC/USD");
    }
}
