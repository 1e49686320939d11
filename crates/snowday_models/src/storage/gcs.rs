//! Google Cloud Storage uploads through the JSON API.

use super::check_object_path;
use crate::config::GcsConfig;
use crate::http::build_client;
use async_trait::async_trait;
use reqwest::Client;
use snowday_error::{SnowdayResult, StorageError, StorageErrorKind};
use snowday_interface::ObjectStore;
use tracing::{debug, error, instrument};

/// Uploads objects to a publicly readable bucket.
///
/// Objects are written with a simple media upload, which overwrites any
/// object already at the path.
#[derive(Debug, Clone)]
pub struct GcsObjectStore {
    client: Client,
    config: GcsConfig,
}

impl GcsObjectStore {
    /// Create a store for the configured bucket.
    pub fn new(config: GcsConfig) -> SnowdayResult<Self> {
        Ok(Self {
            client: build_client(*config.timeout())?,
            config,
        })
    }
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    #[instrument(skip(self, bytes), fields(bucket = %self.config.bucket(), bytes = bytes.len()))]
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> SnowdayResult<String> {
        check_object_path(path)?;
        let url = format!(
            "{}/b/{}/o",
            self.config.upload_base_url().trim_end_matches('/'),
            self.config.bucket()
        );

        let response = self
            .client
            .post(url)
            .query(&[("uploadType", "media"), ("name", path)])
            .bearer_auth(self.config.access_token())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Upload request failed");
                StorageError::new(StorageErrorKind::Unavailable(e.to_string()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %body, "Upload rejected");
            let kind = match status.as_u16() {
                401 | 403 => StorageErrorKind::PermissionDenied(body),
                _ => StorageErrorKind::Unavailable(format!("status {}: {}", status, body)),
            };
            return Err(StorageError::new(kind).into());
        }

        let public = self.config.public_url(path);
        debug!(url = %public, "Uploaded object");
        Ok(public)
    }
}
