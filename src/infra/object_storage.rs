//! Object storage for uploaded images.
//!
//! The service only decides the object key and bucket; the actual transfer is
//! handed to the AWS SDK.

use async_trait::async_trait;
use bytes::Bytes;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::infra::config::ObjectStorageConfig;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("object storage error: {0}")]
    Storage(String),
}

/// Destination for uploaded files.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `bytes` under `key` with public-read visibility and returns its public URL.
    /// The request buffer is passed through as-is, never copied.
    async fn put_public(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: Option<&str>,
    ) -> Result<String, UploadError>;
}

/// Object key for an uploaded file: `uploads/<epochMillis>_<originalFilename>`.
///
/// Only the last path segment of the client-supplied name is kept.
pub fn upload_key(epoch_millis: i64, filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("file");
    format!("uploads/{epoch_millis}_{base}")
}

/// Public URL of `key`, percent-encoding every path segment of the key.
///
/// With an endpoint override the URL is path-style (`<endpoint>/<bucket>/<key>`),
/// otherwise virtual-hosted AWS style.
pub fn public_url(endpoint: Option<&str>, bucket: &str, region: &str, key: &str) -> String {
    let encoded_key = encode_key(key);
    match endpoint {
        Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, encoded_key),
        None => format!("https://{bucket}.s3.{region}.amazonaws.com/{encoded_key}"),
    }
}

fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

pub struct S3ObjectStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
}

impl S3ObjectStorage {
    /// Builds a client from the default AWS provider chain (env credentials,
    /// profile, instance metadata) with the configured region and endpoint.
    pub async fn from_config(config: &ObjectStorageConfig, bucket: String) -> Self {
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket,
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        }
    }

    fn public_url(&self, key: &str) -> String {
        public_url(self.endpoint.as_deref(), &self.bucket, &self.region, key)
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn put_public(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: Option<&str>,
    ) -> Result<String, UploadError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .body(ByteStream::from(bytes));
        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request
            .send()
            .await
            .map_err(|e| UploadError::Storage(aws_sdk_s3::error::DisplayErrorContext(e).to_string()))?;

        Ok(self.public_url(key))
    }
}

/// Keeps uploads in process memory. Used by tests and by local runs without a bucket.
#[derive(Default)]
pub struct MemoryObjectStorage {
    objects: RwLock<HashMap<String, Bytes>>,
}

impl MemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).map(|b| b.to_vec())
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn put_public(
        &self,
        key: &str,
        bytes: Bytes,
        _content_type: Option<&str>,
    ) -> Result<String, UploadError> {
        self.objects.write().await.insert(key.to_string(), bytes);
        Ok(format!("memory://{}", encode_key(key)))
    }
}
