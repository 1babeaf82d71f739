use crate::infra::object_storage::ObjectStorage;
use crate::storage::RecordStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub object_storage: Arc<dyn ObjectStorage>,
}

/// Body of every non-record response (errors, rate limiting).
#[derive(Serialize, Deserialize, Debug, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct UploadResponse {
    /// Public URL of the stored object.
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Multipart form accepted by `POST /upload` (documentation only).
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}
