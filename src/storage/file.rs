//! Record store persisted to a single JSON file.
//!
//! The whole catalog is held in memory and rewritten to disk after every
//! mutation. A mutation runs read-modify-write-persist under one lock, and the
//! file is replaced atomically (temp file, fsync, rename), so a crash mid-write
//! leaves the previous version intact.

use crate::domain::id::generate_id;
use crate::domain::model::{CatalogModel, CategoryModel, ProductModel};
use crate::domain::record::{pin_id, record_id, shallow_merge, Record};
use crate::storage::{RecordStore, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Collection name -> records, in insertion order.
type Catalog = BTreeMap<String, Vec<Record>>;

pub struct JsonFileStore {
    path: PathBuf,
    catalog: Mutex<Catalog>,
}

impl JsonFileStore {
    /// Loads the catalog from `path`, creating an empty file if none exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let catalog = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Catalog>(&bytes).map_err(|e| {
                StoreError::Corrupt {
                    location: path.display().to_string(),
                    reason: e.to_string(),
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Catalog::new(),
            Err(e) => return Err(e.into()),
        };

        let store = Self {
            path,
            catalog: Mutex::new(catalog),
        };

        // Make sure both collections exist on disk from the first start.
        store
            .mutate(|catalog| {
                for table in [ProductModel.table_name(), CategoryModel.table_name()] {
                    catalog.entry(table.to_string()).or_default();
                }
                Ok(())
            })
            .await?;

        Ok(store)
    }

    /// Applies `f` to a copy of the catalog, persists the copy and only then
    /// publishes it. On any error the in-memory catalog is left untouched.
    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Catalog) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut catalog = self.catalog.lock().await;
        let mut next = catalog.clone();
        let out = f(&mut next)?;
        self.persist(&next).await?;
        *catalog = next;
        Ok(out)
    }

    async fn persist(&self, catalog: &Catalog) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(catalog)?;
        let tmp = self.temp_path();

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("catalog"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn position_of(records: &[Record], id_field: &str, id: &str) -> Option<usize> {
    records
        .iter()
        .position(|r| record_id(r, id_field) == Some(id))
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn list_all(&self, model: &dyn CatalogModel) -> Result<Vec<Record>, StoreError> {
        let catalog = self.catalog.lock().await;
        Ok(catalog
            .get(model.table_name())
            .cloned()
            .unwrap_or_default())
    }

    async fn create(&self, model: &dyn CatalogModel, mut body: Record) -> Result<Record, StoreError> {
        let id_field = model.id_field();
        self.mutate(|catalog| {
            let records = catalog.entry(model.table_name().to_string()).or_default();
            let id = loop {
                let candidate = generate_id(model.id_prefix());
                if position_of(records, id_field, &candidate).is_none() {
                    break candidate;
                }
            };
            pin_id(&mut body, id_field, &id);
            records.push(body.clone());
            Ok(body)
        })
        .await
    }

    async fn update(
        &self,
        model: &dyn CatalogModel,
        id: &str,
        body: Record,
    ) -> Result<Record, StoreError> {
        let id_field = model.id_field();
        self.mutate(|catalog| {
            let records = catalog
                .get_mut(model.table_name())
                .ok_or(StoreError::NotFound)?;
            let idx = position_of(records, id_field, id).ok_or(StoreError::NotFound)?;
            let record = &mut records[idx];
            shallow_merge(record, body);
            pin_id(record, id_field, id);
            Ok(record.clone())
        })
        .await
    }

    async fn delete(&self, model: &dyn CatalogModel, id: &str) -> Result<(), StoreError> {
        let id_field = model.id_field();
        self.mutate(|catalog| {
            let records = catalog
                .get_mut(model.table_name())
                .ok_or(StoreError::NotFound)?;
            let idx = position_of(records, id_field, id).ok_or(StoreError::NotFound)?;
            records.remove(idx);
            Ok(())
        })
        .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value as JsonValue};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn obj(v: JsonValue) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn open_creates_empty_collections_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = JsonFileStore::open(&path).await.unwrap();

        assert!(store.list_all(&ProductModel).await.unwrap().is_empty());
        let on_disk: JsonValue = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk, json!({"categories": [], "products": []}));
    }

    #[tokio::test]
    async fn create_assigns_identifier_and_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = JsonFileStore::open(&path).await.unwrap();

        let created = store
            .create(&ProductModel, obj(json!({"name": "Widget", "price": 9.99})))
            .await
            .unwrap();
        let id = record_id(&created, "ProductID").unwrap().to_string();
        assert!(id.starts_with("prod_"));

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let products = reopened.list_all(&ProductModel).await.unwrap();
        assert_eq!(products, vec![created]);
        assert!(reopened.list_all(&CategoryModel).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_overwrites_client_supplied_identifier() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("db.json")).await.unwrap();

        let created = store
            .create(&CategoryModel, obj(json!({"CategoryID": "mine", "name": "Tools"})))
            .await
            .unwrap();
        assert_ne!(record_id(&created, "CategoryID"), Some("mine"));
    }

    #[tokio::test]
    async fn update_merges_and_pins_identifier() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("db.json")).await.unwrap();
        let created = store
            .create(&ProductModel, obj(json!({"name": "Widget", "price": 9.99})))
            .await
            .unwrap();
        let id = record_id(&created, "ProductID").unwrap().to_string();

        let updated = store
            .update(&ProductModel, &id, obj(json!({"price": 5, "ProductID": "other"})))
            .await
            .unwrap();
        assert_eq!(
            JsonValue::Object(updated),
            json!({"name": "Widget", "price": 5, "ProductID": id})
        );
    }

    #[tokio::test]
    async fn missing_identifier_is_not_found_and_changes_nothing() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("db.json")).await.unwrap();
        store
            .create(&ProductModel, obj(json!({"name": "Widget"})))
            .await
            .unwrap();
        let before = store.list_all(&ProductModel).await.unwrap();

        let err = store
            .update(&ProductModel, "prod_123", obj(json!({"price": 5})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        let err = store.delete(&ProductModel, "prod_123").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        assert_eq!(store.list_all(&ProductModel).await.unwrap(), before);
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_record() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("db.json")).await.unwrap();
        let a = store.create(&ProductModel, obj(json!({"n": 1}))).await.unwrap();
        let b = store.create(&ProductModel, obj(json!({"n": 2}))).await.unwrap();

        store
            .delete(&ProductModel, record_id(&a, "ProductID").unwrap())
            .await
            .unwrap();
        assert_eq!(store.list_all(&ProductModel).await.unwrap(), vec![b]);
    }

    #[tokio::test]
    async fn concurrent_creates_are_not_lost() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = Arc::new(JsonFileStore::open(&path).await.unwrap());

        let mut handles = Vec::new();
        for n in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .create(&ProductModel, obj(json!({ "n": n })))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(store.list_all(&ProductModel).await.unwrap().len(), 32);
        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.list_all(&ProductModel).await.unwrap().len(), 32);
    }

    #[tokio::test]
    async fn corrupt_file_fails_to_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, b"{not json").unwrap();

        let err = JsonFileStore::open(&path).await.err().unwrap();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn failed_persist_leaves_memory_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = JsonFileStore::open(&path).await.unwrap();

        // A directory squatting on the temp path makes the write fail.
        std::fs::create_dir(dir.path().join("db.json.tmp")).unwrap();
        assert!(store
            .create(&ProductModel, obj(json!({"name": "x"})))
            .await
            .is_err());
        assert!(store.list_all(&ProductModel).await.unwrap().is_empty());
    }
}
