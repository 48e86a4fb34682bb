use tracing::{error, info};

use crate::database::{PriceRepository, UpsertOutcome};
use crate::error::AppError;
use crate::models::PriceSample;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub modified: usize,
    pub unchanged: usize,
}

impl UpsertSummary {
    /// Documents actually written: inserted plus modified.
    pub fn written(&self) -> usize {
        self.inserted + self.modified
    }

    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Modified => self.modified += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }
}

pub struct PriceStorageService<R> {
    repository: R,
}

impl<R: PriceRepository> PriceStorageService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Upserts every sample by timestamp, in order. Stops at the first
    /// rejected write; writes before it stay committed.
    pub async fn upsert_all(&self, samples: &[PriceSample]) -> Result<UpsertSummary, AppError> {
        let mut summary = UpsertSummary::default();
        if samples.is_empty() {
            info!("No price data provided to insert.");
            return Ok(summary);
        }

        info!("Attempting to insert/update {} price data items.", samples.len());
        for sample in samples {
            match self.repository.upsert_sample(sample).await {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    error!(
                        "Upsert stopped at timestamp {}: {} ({} documents written before the failure)",
                        sample.timestamp,
                        e,
                        summary.written()
                    );
                    return Err(e);
                }
            }
        }

        info!(
            "Data insertion/update complete: {} inserted, {} modified, {} unchanged.",
            summary.inserted, summary.modified, summary.unchanged
        );
        Ok(summary)
    }
}
