pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use domain::model::{CatalogModel, CategoryModel, ProductModel};
pub use domain::record::Record;
pub use infra::config::AppConfig;
pub use infra::object_storage::{MemoryObjectStorage, ObjectStorage, S3ObjectStorage};
pub use storage::{JsonFileStore, PostgresRecordStore, RecordStore, StoreError};
