//! Google Cloud Storage resumable upload

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bridge_traits::storage::{StorageBackend, UploadTarget};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::file_len;

const UPLOAD_ID_HEADER: &str = "X-GUploader-UploadID";

/// Two-phase resumable upload against a signed GCS URL
///
/// 1. `POST` with `x-goog-resumable: start` opens a session (201)
/// 2. `PUT` of the whole file to the session URL completes it (200)
pub struct GcsBackend {
    http_client: Arc<dyn HttpClient>,
}

impl GcsBackend {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self { http_client }
    }

    async fn start_session(&self, upload_url: &str) -> Result<String> {
        let request =
            HttpRequest::new(HttpMethod::Post, upload_url).header("x-goog-resumable", "start");

        let response = self.http_client.execute(request).await?;
        if response.status != 201 {
            return Err(BridgeError::UnexpectedStatus {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).to_string(),
            });
        }

        response
            .header(UPLOAD_ID_HEADER)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                BridgeError::OperationFailed(format!(
                    "resumable session response carries no {} header",
                    UPLOAD_ID_HEADER
                ))
            })
    }

    fn session_url(upload_url: &str, upload_id: &str) -> String {
        let separator = if upload_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}upload_id={}",
            upload_url,
            separator,
            urlencoding::encode(upload_id)
        )
    }
}

#[async_trait]
impl StorageBackend for GcsBackend {
    #[instrument(skip(self, target), fields(file_id = %target.id, path = %local_path.display()))]
    async fn upload(&self, local_path: &Path, target: &UploadTarget) -> Result<()> {
        let len = file_len(local_path).await?;
        let upload_id = self.start_session(&target.upload_url).await?;
        debug!(upload_id = %upload_id, "Opened resumable session");

        let request = HttpRequest::new(
            HttpMethod::Put,
            Self::session_url(&target.upload_url, &upload_id),
        )
        .file_body(local_path, len);

        let response = self.http_client.execute(request).await?;
        if response.status != 200 {
            return Err(BridgeError::UnexpectedStatus {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).to_string(),
            });
        }

        debug!(bytes = len, "Uploaded to GCS");
        Ok(())
    }
}
