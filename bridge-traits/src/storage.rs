//! Storage Abstractions
//!
//! Provides platform-agnostic traits for durable key-value persistence and for
//! byte transfer into remote object storage.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;

/// Durable key-value storage trait
///
/// Single-key operations must be atomic and safe to call concurrently from
/// many tasks. There are no cross-key transactions.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::KeyValueStore;
///
/// async fn remember(store: &dyn KeyValueStore) -> Result<()> {
///     store.set("files:photos/a.jpg", br#"{"kind":"file"}"#).await?;
///     assert!(store.has_key("files:photos/a.jpg").await?);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieve the value stored under `key`
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Delete a key; deleting a missing key is not an error
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a key exists without retrieving it
    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Release the underlying storage; no further calls are expected
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Destination of a single byte transfer
///
/// Built from the file record the catalog returns when a file is registered.
/// The upload URL and credentials are one-time values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadTarget {
    pub id: String,
    pub name: String,
    pub original_name: String,
    pub directory_path: String,
    pub size: u64,
    pub upload_url: String,
    pub upload_credentials: HashMap<String, String>,
}

impl UploadTarget {
    /// Object name relative to the storage root (`dir/name`, or `name` at the root)
    pub fn object_name(&self) -> String {
        let name = if self.name.is_empty() {
            &self.original_name
        } else {
            &self.name
        };

        if self.directory_path.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", self.directory_path.trim_end_matches('/'), name)
        }
    }
}

/// Byte transfer into remote object storage
///
/// One implementation exists per storage method (B2, GCS, S3). Every error is
/// treated as transient by callers, which retry the whole upload.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Upload the file at `local_path` to `target`
    async fn upload(&self, local_path: &Path, target: &UploadTarget) -> Result<()>;
}
