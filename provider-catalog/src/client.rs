//! Catalog client abstraction

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Asset, CatalogFile, Collection, FileSet, Format, StorageDescriptor};

/// Remote asset catalog
///
/// Every call is a single JSON request. A non-2xx answer is returned as
/// [`CatalogError::Api`](crate::error::CatalogError::Api) with the response body.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Create a collection and return it with its assigned id
    async fn create_collection(&self, collection: &Collection) -> Result<Collection>;

    /// Create an asset, assigning it to `asset.collection_id` when set
    async fn create_asset(&self, asset: &Asset) -> Result<Asset>;

    /// Create a format under `asset_id`
    async fn create_asset_format(&self, asset_id: &str, format: &Format) -> Result<Format>;

    /// Create a file set under `asset_id`
    async fn create_file_set(&self, asset_id: &str, file_set: &FileSet) -> Result<FileSet>;

    /// Register a file under `asset_id`; the response carries upload details
    async fn create_file(&self, asset_id: &str, file: &CatalogFile) -> Result<CatalogFile>;

    /// Mark a file as fully uploaded
    async fn close_file(&self, asset_id: &str, file_id: &str) -> Result<()>;

    /// Start keyframe generation for a file, returning the job id if any
    async fn trigger_keyframes(&self, asset_id: &str, file_id: &str) -> Result<Option<String>>;

    /// Fetch a storage descriptor
    async fn get_storage(&self, storage_id: &str) -> Result<StorageDescriptor>;
}
