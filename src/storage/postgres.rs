//! Record store implementation using PostgreSQL.
//!
//! Each collection is a table with a single JSONB column holding the whole
//! record. The identifier lives inside the document and is covered by a unique
//! expression index.

use crate::domain::id::generate_id;
use crate::domain::model::{CatalogModel, CategoryModel, ProductModel};
use crate::domain::record::{pin_id, Record};
use crate::infra::config::PostgresSettings;
use crate::storage::{RecordStore, StoreError};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{PgPool, Row};
use std::str::FromStr;

/// A record store backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    /// Connects using the configured URL and creates the catalog tables.
    pub async fn connect(settings: &PostgresSettings) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(connect_options(settings)?)
            .await?;

        Ok(Self::with_pool(pool).await?)
    }

    /// Wraps an existing pool, creating the catalog tables if needed.
    pub async fn with_pool(pool: PgPool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.ensure_schema(&ProductModel).await?;
        store.ensure_schema(&CategoryModel).await?;
        Ok(store)
    }

    async fn ensure_schema(&self, model: &dyn CatalogModel) -> Result<(), StoreError> {
        for sql in model.get_create_table_sql() {
            sqlx::query(&sql).execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// Parses the connection URL and applies the TLS policy.
pub fn connect_options(settings: &PostgresSettings) -> Result<PgConnectOptions, StoreError> {
    let mut options = PgConnectOptions::from_str(&settings.database_url)?;
    if let Some(mode) = ssl_mode_override(settings) {
        options = options.ssl_mode(mode);
    }
    Ok(options)
}

/// TLS mode forced on top of the URL.
///
/// Relaxed: TLS is required but the certificate is not checked. Strict: the
/// certificate and host name are verified unless the URL picks its own `sslmode`.
fn ssl_mode_override(settings: &PostgresSettings) -> Option<PgSslMode> {
    if !settings.reject_unauthorized {
        Some(PgSslMode::Require)
    } else if url_sets_ssl_mode(&settings.database_url) {
        None
    } else {
        Some(PgSslMode::VerifyFull)
    }
}

fn url_sets_ssl_mode(url: &str) -> bool {
    let Some((_, query)) = url.split_once('?') else {
        return false;
    };
    query.split('&').any(|pair| {
        let key = pair.split('=').next().unwrap_or_default();
        key.eq_ignore_ascii_case("sslmode") || key.eq_ignore_ascii_case("ssl-mode")
    })
}

fn into_record(table: &str, value: JsonValue) -> Result<Record, StoreError> {
    match value {
        JsonValue::Object(map) => Ok(map),
        other => Err(StoreError::Corrupt {
            location: table.to_string(),
            reason: format!("expected a JSON object, found {other}"),
        }),
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn list_all(&self, model: &dyn CatalogModel) -> Result<Vec<Record>, StoreError> {
        let table = model.table_name();
        let rows = sqlx::query(&format!("SELECT data FROM {table}"))
            .fetch_all(&self.pool)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let data: JsonValue = row.try_get("data")?;
            records.push(into_record(table, data)?);
        }
        Ok(records)
    }

    async fn create(&self, model: &dyn CatalogModel, mut body: Record) -> Result<Record, StoreError> {
        let table = model.table_name();
        let id = generate_id(model.id_prefix());
        pin_id(&mut body, model.id_field(), &id);

        let row = sqlx::query(&format!(
            "INSERT INTO {table} (data) VALUES ($1) RETURNING data"
        ))
        .bind(JsonValue::Object(body))
        .fetch_one(&self.pool)
        .await?;

        into_record(table, row.try_get("data")?)
    }

    async fn update(
        &self,
        model: &dyn CatalogModel,
        id: &str,
        body: Record,
    ) -> Result<Record, StoreError> {
        let table = model.table_name();
        let id_field = model.id_field();

        // `||` on JSONB is a shallow merge; the trailing object re-pins the identifier.
        let sql = format!(
            "UPDATE {table} \
             SET data = data || $2 || jsonb_build_object('{id_field}', $1::text) \
             WHERE data->>'{id_field}' = $1 \
             RETURNING data"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(JsonValue::Object(body))
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => into_record(table, row.try_get("data")?),
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, model: &dyn CatalogModel, id: &str) -> Result<(), StoreError> {
        let table = model.table_name();
        let result = sqlx::query(&format!(
            "DELETE FROM {table} WHERE data->>'{}' = $1",
            model.id_field()
        ))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
