//! Backblaze B2 direct upload

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bridge_traits::storage::{StorageBackend, UploadTarget};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::hash::sha1_hex;
use crate::file_len;

/// Credential key holding the upload authorization token
const AUTHORIZATION_TOKEN: &str = "authorizationToken";

/// Single-request checksummed upload to a B2 upload URL
///
/// The catalog hands out the upload URL and an `authorizationToken`
/// credential. B2 verifies the `X-Bz-Content-Sha1` header against the
/// received bytes and rejects the upload on mismatch.
pub struct B2Backend {
    http_client: Arc<dyn HttpClient>,
}

impl B2Backend {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self { http_client }
    }

    /// `X-Bz-File-Name` value: the object name with each segment percent-encoded
    fn file_name_header(target: &UploadTarget) -> String {
        target
            .object_name()
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[async_trait]
impl StorageBackend for B2Backend {
    #[instrument(skip(self, target), fields(file_id = %target.id, path = %local_path.display()))]
    async fn upload(&self, local_path: &Path, target: &UploadTarget) -> Result<()> {
        let token = target
            .upload_credentials
            .get(AUTHORIZATION_TOKEN)
            .ok_or_else(|| {
                BridgeError::OperationFailed(format!(
                    "upload credentials for file {} carry no {}",
                    target.id, AUTHORIZATION_TOKEN
                ))
            })?;

        let len = file_len(local_path).await?;
        let checksum = sha1_hex(local_path).await?;

        let request = HttpRequest::new(HttpMethod::Post, &target.upload_url)
            .header("Authorization", token)
            .header("X-Bz-File-Name", Self::file_name_header(target))
            .header("Content-Type", "b2/x-auto")
            .header("X-Bz-Content-Sha1", &checksum)
            .file_body(local_path, len);

        let response = self.http_client.execute(request).await?;
        if response.status != 200 {
            return Err(BridgeError::UnexpectedStatus {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).to_string(),
            });
        }

        debug!(bytes = len, sha1 = %checksum, "Uploaded to B2");
        Ok(())
    }
}
