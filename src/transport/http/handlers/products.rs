use crate::domain::model::ProductModel;
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
    path = "/products",
    responses(
        (status = 200, description = "Every stored product"),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn list_products_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Record>>, ApiError> {
    records::list(&state, &ProductModel).await
}

#[utoipa::path(
    post,
    path = "/products",
    request_body(content = Object, content_type = "application/json", description = "Record fields (any JSON object)"),
    responses(
        (status = 201, description = "Product created; the body carries the generated `ProductID`"),
        (status = 400, description = "Body is not a JSON object", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn create_product_handler(
    State(state): State<AppState>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    records::create(&state, &ProductModel, body).await
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    params(
        ("id" = String, Path, description = "Product identifier (`ProductID`)")
    ),
    request_body(content = Object, content_type = "application/json", description = "Record fields (any JSON object)"),
    responses(
        (status = 200, description = "Product updated (shallow merge)"),
        (status = 400, description = "Body is not a JSON object", body = MessageResponse),
        (status = 404, description = "Product not found", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn update_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<Record>, ApiError> {
    records::update(&state, &ProductModel, &id, body).await
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(
        ("id" = String, Path, description = "Product identifier (`ProductID`)")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    records::delete(&state, &ProductModel, &id).await
}
