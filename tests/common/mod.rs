#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use btc_price_tracker::database::{PriceRepository, UpsertOutcome};
use btc_price_tracker::models::PriceSample;
use btc_price_tracker::AppError;
use rust_decimal::Decimal;

/// Timestamp-keyed store with the same upsert semantics as the MongoDB
/// collection.
#[derive(Default)]
pub struct InMemoryPriceRepository {
    documents: Mutex<BTreeMap<i64, (Decimal, String)>>,
}

impl InMemoryPriceRepository {
    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn price_at(&self, timestamp: i64) -> Option<Decimal> {
        self.documents
            .lock()
            .unwrap()
            .get(&timestamp)
            .map(|(price, _)| *price)
    }
}

#[async_trait]
impl PriceRepository for InMemoryPriceRepository {
    async fn upsert_sample(&self, sample: &PriceSample) -> Result<UpsertOutcome, AppError> {
        let mut documents = self.documents.lock().unwrap();
        let value = (sample.price, sample.currency_pair.clone());
        match documents.insert(sample.timestamp, value.clone()) {
            None => Ok(UpsertOutcome::Inserted),
            Some(previous) if previous == value => Ok(UpsertOutcome::Unchanged),
            Some(_) => Ok(UpsertOutcome::Modified),
        }
    }
}

pub fn sample(timestamp: i64, price: i64) -> PriceSample {
    PriceSample::new(timestamp, Decimal::new(price, 0))
}

pub fn market_chart_body(points: &[(i64, f64)]) -> serde_json::Value {
    let prices: Vec<serde_json::Value> = points
        .iter()
        .map(|(ts, price)| serde_json::json!([ts, price]))
        .collect();
    serde_json::json!({
        "prices": prices,
        "market_caps": [],
        "total_volumes": []
    })
}
