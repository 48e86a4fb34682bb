use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::options::{IndexOptions, UpdateOptions};
use mongodb::{Client, Collection, IndexModel};
use rust_decimal::prelude::ToPrimitive;
use tracing::{info, warn};

use super::connection::establish_connection;
use crate::config::DatabaseSettings;
use crate::error::AppError;
use crate::models::{PersistenceTarget, PriceSample};

const TIMESTAMP_INDEX: &str = "timestamp_unique";

/// What a single upsert did to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Modified,
    /// Matched an existing document that already held the same values.
    Unchanged,
}

/// Storage keyed by sample timestamp. Each call is committed on its own.
#[async_trait]
pub trait PriceRepository: Send + Sync {
    async fn upsert_sample(&self, sample: &PriceSample) -> Result<UpsertOutcome, AppError>;
}

pub struct MongoPriceRepository {
    collection: Collection<Document>,
}

impl MongoPriceRepository {
    pub fn new(client: &Client, target: &PersistenceTarget) -> Self {
        let collection = client
            .database(&target.database_name)
            .collection::<Document>(&target.collection_name);
        Self { collection }
    }

    /// Connects, verifies the server answers, and makes sure the timestamp
    /// index exists.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, AppError> {
        let client = establish_connection(settings).await?;
        let repository = Self::new(&client, &PersistenceTarget::from(settings));
        repository.ensure_indexes().await;
        Ok(repository)
    }

    /// A unique index on `timestamp`. Failure is logged and ignored; the
    /// upsert filter alone already prevents duplicates from this writer.
    pub async fn ensure_indexes(&self) {
        let model = IndexModel::builder()
            .keys(doc! { "timestamp": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name(TIMESTAMP_INDEX.to_string())
                    .build(),
            )
            .build();

        match self.collection.create_index(model, None).await {
            Ok(result) => info!("Ensured index {} on {}", result.index_name, self.collection.name()),
            Err(e) => warn!(
                "Could not create unique timestamp index on {}: {}",
                self.collection.name(),
                e
            ),
        }
    }
}

#[async_trait]
impl PriceRepository for MongoPriceRepository {
    async fn upsert_sample(&self, sample: &PriceSample) -> Result<UpsertOutcome, AppError> {
        let price = sample.price.to_f64().ok_or_else(|| {
            AppError::PersistenceError(format!(
                "Price {} at {} is not representable as a double",
                sample.price, sample.timestamp
            ))
        })?;

        let filter = doc! { "timestamp": sample.timestamp };
        let update = doc! {
            "$set": {
                "price": price,
                "currency_pair": sample.currency_pair.as_str(),
            }
        };
        let options = UpdateOptions::builder().upsert(true).build();

        let result = self
            .collection
            .update_one(filter, update, options)
            .await
            .map_err(|e| {
                AppError::PersistenceError(format!(
                    "Upsert of timestamp {} failed: {}",
                    sample.timestamp, e
                ))
            })?;

        Ok(if result.upserted_id.is_some() {
            UpsertOutcome::Inserted
        } else if result.modified_count > 0 {
            UpsertOutcome::Modified
        } else {
            UpsertOutcome::Unchanged
        })
    }
}
