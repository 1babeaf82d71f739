//! Persistence adapters for catalog records.
//!
//! Two interchangeable implementations of [`RecordStore`] exist: a Postgres
//! store keeping each record as a JSONB document, and a flat JSON file store.
//! A deployment picks exactly one of them at startup.

use crate::domain::model::CatalogModel;
use crate::domain::record::Record;
use crate::infra::config::StorageConfig;
use async_trait::async_trait;
use std::sync::Arc;

pub mod file;
pub mod postgres;

pub use file::JsonFileStore;
pub use postgres::PostgresRecordStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// `location` names the table or file holding the bad data.
    #[error("corrupt data in '{location}': {reason}")]
    Corrupt { location: String, reason: String },
}

/// Contract shared by both persistence adapters.
///
/// Every operation touches a single record (or lists one collection); there
/// are no multi-record transactions.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns every record of the collection, unfiltered.
    async fn list_all(&self, model: &dyn CatalogModel) -> Result<Vec<Record>, StoreError>;

    /// Assigns a fresh identifier to `body`, persists it and returns the stored record.
    async fn create(&self, model: &dyn CatalogModel, body: Record) -> Result<Record, StoreError>;

    /// Shallow-merges `body` into the record identified by `id`.
    ///
    /// The identifier field is always pinned to `id` after the merge.
    async fn update(
        &self,
        model: &dyn CatalogModel,
        id: &str,
        body: Record,
    ) -> Result<Record, StoreError>;

    /// Removes the record identified by `id`.
    async fn delete(&self, model: &dyn CatalogModel, id: &str) -> Result<(), StoreError>;

    /// Cheap reachability check used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Builds the store selected by configuration.
pub async fn connect(config: &StorageConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    match config {
        StorageConfig::Postgres(settings) => {
            tracing::info!("using postgres record store");
            Ok(Arc::new(PostgresRecordStore::connect(settings).await?))
        }
        StorageConfig::File { path } => {
            tracing::info!(path = %path.display(), "using json file record store");
            Ok(Arc::new(JsonFileStore::open(path).await?))
        }
    }
}
