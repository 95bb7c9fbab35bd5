//! Shared fakes for the sync integration tests
//!
//! The fake catalog and the fake storage backend append to one call log, so
//! tests can assert on the exact order of remote operations.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_desktop::SqliteKeyValueStore;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::storage::{StorageBackend, UploadTarget};
use core_sync::{AssetSync, CollectionSync, PathInfo, RetryPolicy, TrackedStore};
use provider_catalog::{
    Asset, CatalogClient, CatalogError, CatalogFile, Collection, FileSet, Format,
    Result as CatalogResult, StorageDescriptor,
};
use provider_storage::StorageBackends;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Mutex as AsyncMutex;

pub type CallLog = Arc<AsyncMutex<Vec<String>>>;

// ============================================================================
// Fake catalog
// ============================================================================

pub struct FakeCatalog {
    log: CallLog,
    next_id: AtomicU32,
    fail_on: std::sync::Mutex<Option<String>>,
    asset_delay: std::sync::Mutex<Duration>,
    pub collections: AsyncMutex<Vec<Collection>>,
    pub assets: AsyncMutex<Vec<Asset>>,
    pub formats: AsyncMutex<Vec<Format>>,
    pub files: AsyncMutex<Vec<CatalogFile>>,
}

impl FakeCatalog {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            next_id: AtomicU32::new(1),
            fail_on: std::sync::Mutex::new(None),
            asset_delay: std::sync::Mutex::new(Duration::ZERO),
            collections: AsyncMutex::new(Vec::new()),
            assets: AsyncMutex::new(Vec::new()),
            formats: AsyncMutex::new(Vec::new()),
            files: AsyncMutex::new(Vec::new()),
        }
    }

    /// Make every call named `operation` fail with a 500
    pub fn fail_on(&self, operation: &str) {
        *self.fail_on.lock().unwrap() = Some(operation.to_string());
    }

    /// Slow down `create_asset`, keeping a workflow in flight for a while
    pub fn delay_assets(&self, delay: Duration) {
        *self.asset_delay.lock().unwrap() = delay;
    }

    fn next_id(&self, kind: &str) -> String {
        format!("{}-{}", kind, self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn record(&self, operation: &str, call: String) -> CatalogResult<()> {
        self.log.lock().await.push(call);

        let failing = self.fail_on.lock().unwrap().clone();
        if failing.as_deref() == Some(operation) {
            return Err(CatalogError::Api {
                status_code: 500,
                message: format!("{} failed", operation),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn create_collection(&self, collection: &Collection) -> CatalogResult<Collection> {
        self.record(
            "create_collection",
            format!("create_collection:{}:{}", collection.title, collection.parent_id),
        )
        .await?;

        let created = Collection {
            id: self.next_id("col"),
            ..collection.clone()
        };
        self.collections.lock().await.push(created.clone());
        Ok(created)
    }

    async fn create_asset(&self, asset: &Asset) -> CatalogResult<Asset> {
        let delay = *self.asset_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.record(
            "create_asset",
            format!("create_asset:{}:{}", asset.title, asset.collection_id),
        )
        .await?;

        let created = Asset {
            id: self.next_id("asset"),
            ..asset.clone()
        };
        self.assets.lock().await.push(created.clone());
        Ok(created)
    }

    async fn create_asset_format(&self, asset_id: &str, format: &Format) -> CatalogResult<Format> {
        self.record("create_asset_format", format!("create_asset_format:{}", asset_id))
            .await?;

        let created = Format {
            id: self.next_id("format"),
            ..format.clone()
        };
        self.formats.lock().await.push(created.clone());
        Ok(created)
    }

    async fn create_file_set(&self, asset_id: &str, file_set: &FileSet) -> CatalogResult<FileSet> {
        self.record("create_file_set", format!("create_file_set:{}", asset_id))
            .await?;

        Ok(FileSet {
            id: self.next_id("file_set"),
            ..file_set.clone()
        })
    }

    async fn create_file(&self, asset_id: &str, file: &CatalogFile) -> CatalogResult<CatalogFile> {
        self.record("create_file", format!("create_file:{}", asset_id))
            .await?;

        let id = self.next_id("file");
        let created = CatalogFile {
            upload_url: format!("https://upload.test/{}", id),
            upload_credentials: HashMap::from([(
                "authorizationToken".to_string(),
                "token".to_string(),
            )]),
            id,
            ..file.clone()
        };
        self.files.lock().await.push(created.clone());
        Ok(created)
    }

    async fn close_file(&self, asset_id: &str, file_id: &str) -> CatalogResult<()> {
        self.record("close_file", format!("close_file:{}:{}", asset_id, file_id))
            .await
    }

    async fn trigger_keyframes(&self, asset_id: &str, file_id: &str) -> CatalogResult<Option<String>> {
        self.record(
            "trigger_keyframes",
            format!("trigger_keyframes:{}:{}", asset_id, file_id),
        )
        .await?;
        Ok(Some("job-1".to_string()))
    }

    async fn get_storage(&self, storage_id: &str) -> CatalogResult<StorageDescriptor> {
        self.record("get_storage", format!("get_storage:{}", storage_id))
            .await?;
        Ok(storage("B2"))
    }
}

// ============================================================================
// Fake storage backend
// ============================================================================

pub struct FakeBackend {
    log: CallLog,
    failures_remaining: AtomicU32,
    pub attempts: AtomicU32,
}

impl FakeBackend {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            failures_remaining: AtomicU32::new(0),
            attempts: AtomicU32::new(0),
        }
    }

    /// Fail the next `count` uploads
    pub fn fail_next(&self, count: u32) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl StorageBackend for FakeBackend {
    async fn upload(&self, local_path: &Path, target: &UploadTarget) -> BridgeResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.log
            .lock()
            .await
            .push(format!("upload:{}", target.object_name()));

        if !local_path.is_file() {
            return Err(BridgeError::OperationFailed(format!(
                "no such file: {}",
                local_path.display()
            )));
        }

        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(BridgeError::Connection("connection reset".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub fn storage(method: &str) -> StorageDescriptor {
    StorageDescriptor {
        id: "storage-1".to_string(),
        name: "Primary".to_string(),
        method: method.to_string(),
        ..Default::default()
    }
}

/// Retries without waiting a full second between attempts
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(10),
    }
}

pub struct Harness {
    pub root: TempDir,
    pub log: CallLog,
    pub catalog: Arc<FakeCatalog>,
    pub backend: Arc<FakeBackend>,
    pub kv: Arc<SqliteKeyValueStore>,
    pub store: TrackedStore,
}

impl Harness {
    pub async fn new() -> Self {
        let log: CallLog = Arc::default();
        let kv = Arc::new(SqliteKeyValueStore::in_memory().await.unwrap());

        Self {
            root: tempfile::tempdir().unwrap(),
            catalog: Arc::new(FakeCatalog::new(Arc::clone(&log))),
            backend: Arc::new(FakeBackend::new(Arc::clone(&log))),
            store: TrackedStore::new(kv.clone()),
            kv,
            log,
        }
    }

    pub fn asset_sync(&self, method: &str) -> AssetSync {
        AssetSync::new(
            self.root.path(),
            self.catalog.clone(),
            self.store.clone(),
            Arc::new(storage(method)),
            StorageBackends::uniform(self.backend.clone()),
        )
        .with_retry_policy(fast_retry())
    }

    pub fn collection_sync(&self) -> CollectionSync {
        CollectionSync::new(self.catalog.clone(), self.store.clone())
    }

    /// Create a file below the scan root, with parent directories
    pub fn write_file(&self, relative_path: &str, content: &[u8]) -> PathInfo {
        let full = self.root.path().join(relative_path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full, content).unwrap();

        let name = full.file_name().unwrap().to_string_lossy().into_owned();
        PathInfo::from_metadata(name, &std::fs::metadata(&full).unwrap())
    }

    pub fn make_dir(&self, relative_path: &str) -> PathInfo {
        let full = self.root.path().join(relative_path);
        std::fs::create_dir_all(&full).unwrap();

        let name = full.file_name().unwrap().to_string_lossy().into_owned();
        PathInfo::from_metadata(name, &std::fs::metadata(&full).unwrap())
    }

    pub async fn calls(&self) -> Vec<String> {
        self.log.lock().await.clone()
    }

    pub async fn count_calls(&self, prefix: &str) -> usize {
        self.log
            .lock()
            .await
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }
}
