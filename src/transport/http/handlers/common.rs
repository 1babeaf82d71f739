use crate::domain::model::CatalogModel;
use crate::domain::record::{record_from_body, Record};
use crate::storage::StoreError;
use crate::transport::http::types::MessageResponse;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value as JsonValue;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Errors surfaced at the route boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("No file uploaded")]
    NoFileProvided,
    #[error("{0}")]
    BadRequest(String),
    /// Detail is logged server-side and never sent to the client.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Maps a store failure for `model`, turning `NotFound` into the model's 404 message.
    pub fn from_store(model: &dyn CatalogModel, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound(model.not_found_message()),
            other => ApiError::Internal(format!("{} store: {}", model.table_name(), other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::NoFileProvided => (StatusCode::BAD_REQUEST, "No file uploaded".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };
        (status, Json(MessageResponse::new(message))).into_response()
    }
}

/// Unwraps a JSON body and checks it is an object.
pub fn parse_record_body(body: Result<Json<JsonValue>, JsonRejection>) -> Result<Record, ApiError> {
    let Json(value) =
        body.map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e.body_text())))?;
    record_from_body(value).map_err(ApiError::BadRequest)
}
