use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::PriceApiSettings;
use crate::error::types::AppError;
use crate::models::{FetchRequest, MarketChartResponse, PriceSample};
use crate::utils::time::format_timestamp_millis;

const API_KEY_HEADER: &str = "x-cg-demo-api-key";
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Why a single market-chart request was not usable.
#[derive(Error, Debug)]
enum AttemptError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("status code {status}, response: {body}")]
    Status { status: u16, body: String },
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("response contained no price points")]
    Empty,
}

/// Market-chart client with a single coarser-granularity fallback.
pub struct PriceFeedService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PriceFeedService {
    pub fn new(settings: &PriceApiSettings) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(concat!("btc-price-tracker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::FetchError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    /// Fetch `days` of prices for `asset` quoted in `vs_currency`, starting at
    /// 15-minute granularity.
    pub async fn fetch(
        &self,
        asset: &str,
        vs_currency: &str,
        days: u32,
    ) -> Result<Vec<PriceSample>, AppError> {
        self.fetch_with_fallback(FetchRequest::new(asset, vs_currency, days))
            .await
    }

    /// Issues `request`; if it fails, issues it once more at the next coarser
    /// granularity. A request that is already at the coarsest granularity
    /// gets no second attempt.
    pub async fn fetch_with_fallback(
        &self,
        request: FetchRequest,
    ) -> Result<Vec<PriceSample>, AppError> {
        info!(
            "Attempting to fetch {} {} price data for the last {} days ({} interval)...",
            request.asset,
            request.vs_currency,
            request.days,
            request.granularity.label()
        );

        let first_error = match self.fetch_once(&request).await {
            Ok(samples) => return Ok(samples),
            Err(e) => e,
        };
        warn!(
            "{} request for {} failed: {}",
            request.granularity.label(),
            request.asset,
            first_error
        );

        let Some(fallback) = request.downgraded() else {
            error!("No coarser granularity left to try for {}", request.asset);
            return Err(AppError::FetchError(format!(
                "{} attempt failed: {}",
                request.granularity.label(),
                first_error
            )));
        };

        info!(
            "Retrying {} with {} granularity",
            fallback.asset,
            fallback.granularity.label()
        );
        match self.fetch_once(&fallback).await {
            Ok(samples) => Ok(samples),
            Err(second_error) => {
                error!(
                    "{} request for {} failed: {}",
                    fallback.granularity.label(),
                    fallback.asset,
                    second_error
                );
                Err(AppError::FetchError(format!(
                    "{} attempt failed: {}; {} attempt failed: {}",
                    request.granularity.label(),
                    first_error,
                    fallback.granularity.label(),
                    second_error
                )))
            }
        }
    }

    async fn fetch_once(&self, request: &FetchRequest) -> Result<Vec<PriceSample>, AttemptError> {
        let url = format!("{}/coins/{}/market_chart", self.base_url, request.asset);

        let mut builder = self.client.get(&url).query(&request.query_params());
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AttemptError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AttemptError::Transport(e.to_string()))?;
        let chart: MarketChartResponse =
            serde_json::from_str(&body).map_err(|e| AttemptError::Malformed(e.to_string()))?;

        if chart.is_empty() {
            return Err(AttemptError::Empty);
        }

        let samples = chart
            .into_samples()
            .map_err(|e| AttemptError::Malformed(e.to_string()))?;

        if let (Some(first), Some(last)) = (samples.first(), samples.last()) {
            info!(
                "Successfully fetched {} {} price points from {} to {}",
                samples.len(),
                request.granularity.label(),
                format_timestamp_millis(first.timestamp),
                format_timestamp_millis(last.timestamp)
            );
        }

        Ok(samples)
    }
}
