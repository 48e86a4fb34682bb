use tracing::info;

use super::price_feed::PriceFeedService;
use super::price_storage::{PriceStorageService, UpsertSummary};
use crate::config::Settings;
use crate::database::{MongoPriceRepository, PriceRepository};
use crate::error::AppError;
use crate::models::{FetchRequest, PriceSample};

pub const ASSET_ID: &str = "bitcoin";
pub const VS_CURRENCY: &str = "usd";
pub const LOOKBACK_DAYS: u32 = 5;

/// The fixed BTC/USD, five-day request made on every run.
pub fn btc_usd_request() -> FetchRequest {
    FetchRequest::new(ASSET_ID, VS_CURRENCY, LOOKBACK_DAYS)
}

pub struct PriceTracker {
    feed: PriceFeedService,
    request: FetchRequest,
}

impl PriceTracker {
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        Ok(Self {
            feed: PriceFeedService::new(&settings.price_api)?,
            request: btc_usd_request(),
        })
    }

    pub async fn fetch(&self) -> Result<Vec<PriceSample>, AppError> {
        let samples = self.feed.fetch_with_fallback(self.request.clone()).await?;
        info!("Fetched {} Bitcoin price points.", samples.len());
        Ok(samples)
    }

    pub async fn persist<R: PriceRepository>(
        &self,
        storage: &PriceStorageService<R>,
        samples: &[PriceSample],
    ) -> Result<UpsertSummary, AppError> {
        let summary = storage.upsert_all(samples).await?;
        info!(
            "{} documents written to MongoDB ({} inserted, {} modified).",
            summary.written(),
            summary.inserted,
            summary.modified
        );
        Ok(summary)
    }
}

/// One full run: fetch, connect, upsert. The database is only contacted once
/// there is something to write.
pub async fn run(settings: &Settings) -> Result<UpsertSummary, AppError> {
    let tracker = PriceTracker::new(settings)?;
    let samples = tracker.fetch().await?;

    let repository = MongoPriceRepository::connect(&settings.database).await?;
    let storage = PriceStorageService::new(repository);

    tracker.persist(&storage, &samples).await
}
