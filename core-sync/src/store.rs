//! # Idempotency Store
//!
//! Durable map from relative path to [`TrackedEntry`], layered over the
//! [`KeyValueStore`] bridge.
//!
//! ## Overview
//!
//! - Keys are `files:` followed by the relative path
//! - Values are the entry serialized as JSON
//! - Single-key operations are atomic; there are no cross-key transactions
//!
//! Only a `Complete` entry counts as tracked when deciding whether a path
//! still needs syncing.

use bridge_traits::storage::KeyValueStore;
use std::sync::Arc;
use tracing::debug;

use crate::entry::{EntryKind, TrackedEntry};
use crate::error::{Result, SyncError};

const KEY_PREFIX: &str = "files:";

#[derive(Clone)]
pub struct TrackedStore {
    store: Arc<dyn KeyValueStore>,
}

impl TrackedStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key(path: &str) -> String {
        format!("{}{}", KEY_PREFIX, path)
    }

    /// Whether any record, pending or complete, exists for `path`
    pub async fn exists(&self, path: &str) -> Result<bool> {
        self.store
            .has_key(&Self::key(path))
            .await
            .map_err(|e| SyncError::Persistence(e.to_string()))
    }

    /// Whether `path` has a completed record
    pub async fn is_complete(&self, path: &str) -> Result<bool> {
        Ok(self
            .get(path)
            .await?
            .is_some_and(|entry| entry.is_complete()))
    }

    pub async fn get(&self, path: &str) -> Result<Option<TrackedEntry>> {
        let Some(bytes) = self
            .store
            .get(&Self::key(path))
            .await
            .map_err(|e| SyncError::Persistence(e.to_string()))?
        else {
            return Ok(None);
        };

        let entry = serde_json::from_slice(&bytes).map_err(|e| {
            SyncError::Persistence(format!("Corrupt record for {}: {}", path, e))
        })?;
        Ok(Some(entry))
    }

    /// Collection id of a tracked directory; `None` for the root or an untracked directory
    pub async fn collection_id(&self, directory: &str) -> Result<Option<String>> {
        if directory.is_empty() {
            return Ok(None);
        }

        Ok(self
            .get(directory)
            .await?
            .filter(|entry| entry.is_complete() && entry.kind == EntryKind::Directory)
            .map(|entry| entry.remote_id))
    }

    pub async fn put(&self, path: &str, entry: &TrackedEntry) -> Result<()> {
        let bytes =
            serde_json::to_vec(entry).map_err(|e| SyncError::Persistence(e.to_string()))?;

        self.store
            .set(&Self::key(path), &bytes)
            .await
            .map_err(|e| SyncError::Persistence(e.to_string()))?;

        debug!(path = %path, status = ?entry.status, "Stored tracked entry");
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.store
            .delete(&Self::key(path))
            .await
            .map_err(|e| SyncError::Persistence(e.to_string()))
    }
}
