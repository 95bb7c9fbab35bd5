//! S3 presigned PUT upload

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bridge_traits::storage::{StorageBackend, UploadTarget};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::file_len;

/// Plain `PUT` of the file to a presigned S3 URL
pub struct S3Backend {
    http_client: Arc<dyn HttpClient>,
}

impl S3Backend {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    #[instrument(skip(self, target), fields(file_id = %target.id, path = %local_path.display()))]
    async fn upload(&self, local_path: &Path, target: &UploadTarget) -> Result<()> {
        let len = file_len(local_path).await?;

        let request = HttpRequest::new(HttpMethod::Put, &target.upload_url)
            .header("Content-Type", "application/octet-stream")
            .file_body(local_path, len);

        let response = self.http_client.execute(request).await?;
        if !matches!(response.status, 200 | 201) {
            return Err(BridgeError::UnexpectedStatus {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).to_string(),
            });
        }

        debug!(bytes = len, "Uploaded to S3");
        Ok(())
    }
}
