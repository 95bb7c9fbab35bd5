//! Catalog REST API connector implementation
//!
//! Implements the `CatalogClient` trait over the `/API/assets/v1` and
//! `/API/files/v1` routes.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use urlencoding::encode;

use crate::client::CatalogClient;
use crate::error::{CatalogError, Result};
use crate::types::{
    Asset, CatalogFile, CloseFileRequest, Collection, FileSet, Format, KeyframesRequest,
    KeyframesResponse, StorageDescriptor,
};

const ASSETS_API: &str = "/API/assets/v1";
const FILES_API: &str = "/API/files/v1";

/// HTTP connector for the catalog API
///
/// Sends the static `App-ID` and `Auth-Token` headers with every request.
/// There is no retry at this layer; a failed call aborts the caller's workflow.
///
/// # Example
///
/// ```ignore
/// use provider_catalog::{CatalogClient, HttpCatalogClient};
///
/// let catalog = HttpCatalogClient::new(http_client, "https://app.iconik.io", app_id, token);
/// let storage = catalog.get_storage("storage-1").await?;
/// ```
pub struct HttpCatalogClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    app_id: String,
    auth_token: String,
}

impl HttpCatalogClient {
    /// Create a new connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `base_url` - Catalog origin, e.g. `https://app.iconik.io`
    /// * `app_id` - Application id sent as `App-ID`
    /// * `auth_token` - Token sent as `Auth-Token`
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.into(),
            auth_token: auth_token.into(),
        }
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest::new(method, format!("{}{}", self.base_url, path))
            .header("Accept", "application/json")
            .header("App-ID", &self.app_id)
            .header("Auth-Token", &self.auth_token)
    }

    /// Execute a request and reject any non-2xx answer
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();

        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            let message = String::from_utf8_lossy(&response.body).to_string();
            warn!(
                method = method.as_str(),
                url = %url,
                status = response.status,
                body = %message,
                "Catalog request failed"
            );
            return Err(CatalogError::Api {
                status_code: response.status,
                message,
            });
        }

        debug!(method = method.as_str(), url = %url, status = response.status, "Catalog request succeeded");
        Ok(response)
    }

    async fn send_json<B, T>(&self, method: HttpMethod, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let request = self.request(method, path).json(body)?;
        let response = self.execute(request).await?;
        parse(&response)
    }
}

fn parse<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(|e| {
        CatalogError::Parse(format!(
            "Failed to parse {}: {}",
            std::any::type_name::<T>()
                .rsplit("::")
                .next()
                .unwrap_or("response"),
            e
        ))
    })
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    #[instrument(skip(self, collection), fields(title = %collection.title))]
    async fn create_collection(&self, collection: &Collection) -> Result<Collection> {
        let created: Collection = self
            .send_json(
                HttpMethod::Post,
                &format!("{}/collections/", ASSETS_API),
                collection,
            )
            .await?;

        info!(collection_id = %created.id, "Created collection");
        Ok(created)
    }

    #[instrument(skip(self, asset), fields(title = %asset.title))]
    async fn create_asset(&self, asset: &Asset) -> Result<Asset> {
        let created: Asset = self
            .send_json(
                HttpMethod::Post,
                &format!("{}/assets/?assign_to_collection=True", ASSETS_API),
                asset,
            )
            .await?;

        info!(asset_id = %created.id, "Created asset");
        Ok(created)
    }

    #[instrument(skip(self, format), fields(asset_id = %asset_id))]
    async fn create_asset_format(&self, asset_id: &str, format: &Format) -> Result<Format> {
        self.send_json(
            HttpMethod::Post,
            &format!("{}/assets/{}/formats/", FILES_API, encode(asset_id)),
            format,
        )
        .await
    }

    #[instrument(skip(self, file_set), fields(asset_id = %asset_id))]
    async fn create_file_set(&self, asset_id: &str, file_set: &FileSet) -> Result<FileSet> {
        self.send_json(
            HttpMethod::Post,
            &format!("{}/assets/{}/file_sets/", FILES_API, encode(asset_id)),
            file_set,
        )
        .await
    }

    #[instrument(skip(self, file), fields(asset_id = %asset_id, name = %file.name))]
    async fn create_file(&self, asset_id: &str, file: &CatalogFile) -> Result<CatalogFile> {
        self.send_json(
            HttpMethod::Post,
            &format!("{}/assets/{}/files/", FILES_API, encode(asset_id)),
            file,
        )
        .await
    }

    #[instrument(skip(self), fields(asset_id = %asset_id, file_id = %file_id))]
    async fn close_file(&self, asset_id: &str, file_id: &str) -> Result<()> {
        let request = self
            .request(
                HttpMethod::Patch,
                &format!(
                    "{}/assets/{}/files/{}/",
                    FILES_API,
                    encode(asset_id),
                    encode(file_id)
                ),
            )
            .json(&CloseFileRequest::default())?;

        self.execute(request).await?;
        debug!("Closed file");
        Ok(())
    }

    #[instrument(skip(self), fields(asset_id = %asset_id, file_id = %file_id))]
    async fn trigger_keyframes(&self, asset_id: &str, file_id: &str) -> Result<Option<String>> {
        let request = self
            .request(
                HttpMethod::Post,
                &format!(
                    "{}/assets/{}/files/{}/keyframes/",
                    FILES_API,
                    encode(asset_id),
                    encode(file_id)
                ),
            )
            .json(&KeyframesRequest::default())?;

        let response = self.execute(request).await?;
        if response.body.is_empty() {
            return Ok(None);
        }

        let job: KeyframesResponse = parse(&response)?;
        Ok(job.job_id)
    }

    #[instrument(skip(self), fields(storage_id = %storage_id))]
    async fn get_storage(&self, storage_id: &str) -> Result<StorageDescriptor> {
        let request = self.request(
            HttpMethod::Get,
            &format!("{}/storages/{}/", FILES_API, encode(storage_id)),
        );

        let response = self.execute(request).await?;
        let storage: StorageDescriptor = parse(&response)?;

        info!(method = %storage.method, name = %storage.name, "Fetched storage");
        Ok(storage)
    }
}
