use crate::domain::id::epoch_millis;
use crate::infra::object_storage::upload_key;
use crate::transport::http::handlers::common::ApiError;
use crate::transport::http::types::{AppState, MessageResponse, UploadForm, UploadResponse};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;

/// Multipart field carrying the file.
pub const IMAGE_FIELD: &str = "image";

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored; returns its public URL", body = UploadResponse),
        (status = 400, description = "No file uploaded", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    // Anything that is not a multipart body cannot carry a file.
    let Ok(mut multipart) = multipart else {
        return Err(ApiError::NoFileProvided);
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        // A form field without a filename is a text value, not a file.
        let Some(filename) = field.file_name().filter(|n| !n.is_empty()).map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Read error: {}", e)))?;

        let key = upload_key(epoch_millis(), &filename);
        let size = bytes.len();
        let image_url = state
            .object_storage
            .put_public(&key, bytes, content_type.as_deref())
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        tracing::info!(%key, size, "image uploaded");
        return Ok(Json(UploadResponse { image_url }));
    }

    Err(ApiError::NoFileProvided)
}
