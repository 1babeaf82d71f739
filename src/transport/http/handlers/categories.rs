use crate::domain::model::CategoryModel;
use crate::domain::record::Record;
use crate::transport::http::handlers::common::ApiError;
use crate::transport::http::handlers::records;
use crate::transport::http::types::{AppState, MessageResponse};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value as JsonValue;

#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "Every stored category"),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn list_categories_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Record>>, ApiError> {
    records::list(&state, &CategoryModel).await
}

#[utoipa::path(
    post,
    path = "/categories",
    request_body(content = Object, content_type = "application/json", description = "Record fields (any JSON object)"),
    responses(
        (status = 201, description = "Category created; the body carries the generated `CategoryID`"),
        (status = 400, description = "Body is not a JSON object", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn create_category_handler(
    State(state): State<AppState>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    records::create(&state, &CategoryModel, body).await
}

#[utoipa::path(
    put,
    path = "/categories/{id}",
    params(
        ("id" = String, Path, description = "Category identifier (`CategoryID`)")
    ),
    request_body(content = Object, content_type = "application/json", description = "Record fields (any JSON object)"),
    responses(
        (status = 200, description = "Category updated (shallow merge)"),
        (status = 400, description = "Body is not a JSON object", body = MessageResponse),
        (status = 404, description = "Category not found", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn update_category_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<Record>, ApiError> {
    records::update(&state, &CategoryModel, &id, body).await
}

#[utoipa::path(
    delete,
    path = "/categories/{id}",
    params(
        ("id" = String, Path, description = "Category identifier (`CategoryID`)")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn delete_category_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    records::delete(&state, &CategoryModel, &id).await
}
