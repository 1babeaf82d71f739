//! Collection-agnostic CRUD flow shared by the product and category routes.
//!
//! Each function makes exactly one store call and maps its outcome.

use crate::domain::model::CatalogModel;
use crate::domain::record::{record_id, Record};
use crate::transport::http::handlers::common::{parse_record_body, ApiError};
use crate::transport::http::types::AppState;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value as JsonValue;

pub async fn list(state: &AppState, model: &dyn CatalogModel) -> Result<Json<Vec<Record>>, ApiError> {
    let records = state
        .store
        .list_all(model)
        .await
        .map_err(|e| ApiError::from_store(model, e))?;
    Ok(Json(records))
}

pub async fn create(
    state: &AppState,
    model: &dyn CatalogModel,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let body = parse_record_body(body)?;
    let record = state
        .store
        .create(model, body)
        .await
        .map_err(|e| ApiError::from_store(model, e))?;
    tracing::info!(
        collection = model.table_name(),
        id = record_id(&record, model.id_field()).unwrap_or_default(),
        "record created"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update(
    state: &AppState,
    model: &dyn CatalogModel,
    id: &str,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<Record>, ApiError> {
    let body = parse_record_body(body)?;
    let record = state
        .store
        .update(model, id, body)
        .await
        .map_err(|e| ApiError::from_store(model, e))?;
    Ok(Json(record))
}

pub async fn delete(
    state: &AppState,
    model: &dyn CatalogModel,
    id: &str,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete(model, id)
        .await
        .map_err(|e| ApiError::from_store(model, e))?;
    tracing::info!(collection = model.table_name(), id, "record deleted");
    Ok(StatusCode::NO_CONTENT)
}
