use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use super::price_sample::PriceSample;
use crate::utils::time::normalize_epoch_millis;

/// Market-chart payload. `market_caps` and `total_volumes` are ignored.
#[derive(Debug, Deserialize)]
pub struct MarketChartResponse {
    pub prices: Vec<MarketPoint>,
}

/// A `[timestamp, price]` pair as sent by the API.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MarketPoint(pub f64, pub f64);

#[derive(Error, Debug, PartialEq)]
pub enum NormalizeError {
    #[error("invalid timestamp {value} at index {index}")]
    InvalidTimestamp { index: usize, value: f64 },
    #[error("invalid price {value} at index {index}")]
    InvalidPrice { index: usize, value: f64 },
}

impl MarketChartResponse {
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Converts the raw pairs into samples keyed by epoch milliseconds, sorted
    /// by timestamp. When a timestamp repeats, the later pair wins.
    pub fn into_samples(self) -> Result<Vec<PriceSample>, NormalizeError> {
        let mut samples = Vec::with_capacity(self.prices.len());

        for (index, MarketPoint(raw_ts, raw_price)) in self.prices.into_iter().enumerate() {
            let timestamp = normalize_epoch_millis(raw_ts)
                .ok_or(NormalizeError::InvalidTimestamp { index, value: raw_ts })?;

            if !raw_price.is_finite() || raw_price < 0.0 {
                return Err(NormalizeError::InvalidPrice { index, value: raw_price });
            }
            let price = Decimal::from_f64(raw_price)
                .ok_or(NormalizeError::InvalidPrice { index, value: raw_price })?;

            samples.push(PriceSample::new(timestamp, price));
        }

        // Stable sort keeps arrival order among equal timestamps, so the last
        // one of each run is the one to keep.
        samples.sort_by_key(|s| s.timestamp);
        let mut deduped: Vec<PriceSample> = Vec::with_capacity(samples.len());
        for sample in samples {
            match deduped.last_mut() {
                Some(last) if last.timestamp == sample.timestamp => *last = sample,
                _ => deduped.push(sample),
            }
        }

        Ok(deduped)
    }
}
