//! # Asset Sync
//!
//! Turns one local file into a closed catalog file with uploaded bytes.
//!
//! ## Overview
//!
//! [`AssetSync::upload_asset`] is a strictly sequential workflow:
//!
//! 1. Store a `Pending` stub for the path
//! 2. Resolve the storage backend from the storage's method
//! 3. Look up the parent directory's collection
//! 4. Create the asset, assigned to that collection when known
//! 5. Create its `ORIGINAL` format
//! 6. Create the file set
//! 7. Register the file, receiving a one-time upload URL
//! 8. Transfer the bytes, retrying whole attempts
//! 9. Close the file
//! 10. Trigger keyframe generation
//!
//! Any failure aborts the workflow and removes the stub, so the path is
//! picked up again by the next scan. Entities already created remotely are
//! left behind.
//!
//! [`AssetSync::upload_if_not_exists`] adds the dedup check in front and
//! persists the completed record afterwards.

use async_trait::async_trait;
use bridge_traits::storage::{StorageBackend, UploadTarget};
use chrono::{DateTime, SecondsFormat, Utc};
use provider_catalog::types::{ASSET_TYPE, FILE_TYPE, ORIGINAL_FORMAT, STATUS_ACTIVE};
use provider_catalog::{Asset, CatalogClient, CatalogFile, FileSet, Format, StorageDescriptor};
use provider_storage::StorageBackends;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, instrument, warn};

use crate::entry::{EntryStatus, TrackedEntry};
use crate::error::{Result, SyncError};
use crate::job::JobHandler;
use crate::path::{guess_media_type, PathInfo};
use crate::retry::RetryPolicy;
use crate::store::TrackedStore;

/// Result of [`AssetSync::upload_if_not_exists`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The workflow ran and the completed record was stored
    Uploaded(TrackedEntry),
    /// A completed record already existed; nothing was done
    AlreadyTracked,
    /// Another invocation for the same path is running; nothing was done
    InFlight,
}

/// Paths with a workflow currently running in this process
#[derive(Default)]
struct InFlight {
    paths: Mutex<HashSet<String>>,
}

impl InFlight {
    fn claim(self: &Arc<Self>, path: &str) -> Option<InFlightGuard> {
        let mut paths = self.paths.lock().unwrap_or_else(PoisonError::into_inner);
        paths.insert(path.to_string()).then(|| InFlightGuard {
            registry: Arc::clone(self),
            path: path.to_string(),
        })
    }
}

struct InFlightGuard {
    registry: Arc<InFlight>,
    path: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry
            .paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.path);
    }
}

/// Mirrors local files as catalog assets
pub struct AssetSync {
    scan_root: PathBuf,
    catalog: Arc<dyn CatalogClient>,
    store: TrackedStore,
    storage: Arc<StorageDescriptor>,
    backends: StorageBackends,
    retry_policy: RetryPolicy,
    in_flight: Arc<InFlight>,
}

impl AssetSync {
    pub fn new(
        scan_root: impl Into<PathBuf>,
        catalog: Arc<dyn CatalogClient>,
        store: TrackedStore,
        storage: Arc<StorageDescriptor>,
        backends: StorageBackends,
    ) -> Self {
        Self {
            scan_root: scan_root.into(),
            catalog,
            store,
            storage,
            backends,
            retry_policy: RetryPolicy::default(),
            in_flight: Arc::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Sync `path` unless it is already tracked or already being synced
    #[instrument(skip(self, info), fields(path = %path))]
    pub async fn upload_if_not_exists(&self, path: &str, info: &PathInfo) -> Result<SyncOutcome> {
        let Some(_guard) = self.in_flight.claim(path) else {
            debug!("Path already in flight");
            return Ok(SyncOutcome::InFlight);
        };

        if self.store.is_complete(path).await? {
            debug!("Path already tracked");
            return Ok(SyncOutcome::AlreadyTracked);
        }

        let entry = self.upload_asset(path, info).await?;

        if let Err(e) = self.store.put(path, &entry).await {
            error!(error = %e, file_id = %entry.remote_id, "Failed to persist completed entry");
        }

        Ok(SyncOutcome::Uploaded(entry))
    }

    /// Run the full remote workflow for the file at `path`
    ///
    /// Returns the completed record without persisting it. A pending stub is
    /// written only when `path` has no record yet, and removed again on failure.
    /// Existing records are never touched.
    pub async fn upload_asset(&self, path: &str, info: &PathInfo) -> Result<TrackedEntry> {
        let stub = TrackedEntry::pending(path, info);
        let wrote_stub = self.write_stub(path, &stub).await;

        match self.run_workflow(stub).await {
            Ok(entry) => Ok(entry),
            Err(e) => {
                if wrote_stub {
                    if let Err(cleanup) = self.store.delete(path).await {
                        warn!(error = %cleanup, "Failed to remove pending entry");
                    }
                }
                Err(e)
            }
        }
    }

    async fn write_stub(&self, path: &str, stub: &TrackedEntry) -> bool {
        match self.store.exists(path).await {
            Ok(true) => {
                debug!("Keeping existing entry");
                false
            }
            Ok(false) => match self.store.put(path, stub).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Failed to store pending entry");
                    false
                }
            },
            Err(e) => {
                warn!(error = %e, "Failed to read existing entry");
                false
            }
        }
    }

    async fn run_workflow(&self, mut entry: TrackedEntry) -> Result<TrackedEntry> {
        let backend = self.backends.resolve(&self.storage.method)?;

        let collection_id = match self.store.collection_id(&entry.directory_path).await {
            Ok(id) => id.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Failed to read parent entry");
                String::new()
            }
        };

        let asset = self
            .catalog
            .create_asset(&Asset {
                title: entry.name.clone(),
                status: STATUS_ACTIVE.to_string(),
                asset_type: ASSET_TYPE.to_string(),
                collection_id,
                ..Default::default()
            })
            .await?;
        debug!(asset_id = %asset.id, "Created asset");

        let format = self
            .catalog
            .create_asset_format(
                &asset.id,
                &Format {
                    name: ORIGINAL_FORMAT.to_string(),
                    status: STATUS_ACTIVE.to_string(),
                    metadata: vec![HashMap::from([(
                        "internet_media_type".to_string(),
                        guess_media_type(&entry.name).to_string(),
                    )])],
                    storage_methods: vec![self.storage.method.clone()],
                    ..Default::default()
                },
            )
            .await?;
        debug!(format_id = %format.id, "Created format");

        let file_set = self
            .catalog
            .create_file_set(
                &asset.id,
                &FileSet {
                    format_id: format.id.clone(),
                    storage_id: self.storage.id.clone(),
                    base_dir: entry.directory_path.clone(),
                    name: entry.name.clone(),
                    component_ids: Vec::new(),
                    ..Default::default()
                },
            )
            .await?;
        debug!(file_set_id = %file_set.id, "Created file set");

        let file = self
            .catalog
            .create_file(
                &asset.id,
                &CatalogFile {
                    name: entry.name.clone(),
                    original_name: entry.name.clone(),
                    directory_path: entry.directory_path.clone(),
                    size: entry.size_bytes,
                    file_type: FILE_TYPE.to_string(),
                    storage_id: self.storage.id.clone(),
                    file_set_id: file_set.id.clone(),
                    format_id: format.id.clone(),
                    file_date_created: Some(rfc3339(entry.created_at)),
                    file_date_modified: Some(rfc3339(entry.modified_at)),
                    ..Default::default()
                },
            )
            .await?;
        debug!(file_id = %file.id, "Created file");

        self.transfer(backend.as_ref(), &entry.relative_path, &UploadTarget::from(&file))
            .await?;

        self.catalog.close_file(&asset.id, &file.id).await?;
        debug!(file_id = %file.id, "Closed file");

        match self.catalog.trigger_keyframes(&asset.id, &file.id).await? {
            Some(job_id) => info!(job_id = %job_id, "Triggered keyframe generation"),
            None => info!("Triggered keyframe generation"),
        }

        entry.status = EntryStatus::Complete;
        entry.remote_id = file.id;
        entry.asset_id = asset.id;
        entry.storage_id = self.storage.id.clone();
        entry.format_id = format.id;
        entry.file_set_id = file_set.id;

        info!(
            asset_id = %entry.asset_id,
            file_id = %entry.remote_id,
            bytes = entry.size_bytes,
            "Asset synced"
        );
        Ok(entry)
    }

    async fn transfer(
        &self,
        backend: &dyn StorageBackend,
        path: &str,
        target: &UploadTarget,
    ) -> Result<()> {
        let local_path = self.local_path(path);

        self.retry_policy
            .execute(|attempt| {
                debug!(attempt, method = %self.storage.method, "Uploading file bytes");
                backend.upload(&local_path, target)
            })
            .await
            .map_err(|e| SyncError::Transfer {
                attempts: e.attempts,
                message: e.last.to_string(),
            })
    }

    /// Absolute location of a relative path under the scan root
    fn local_path(&self, path: &str) -> PathBuf {
        path.split('/')
            .fold(self.scan_root.clone(), |full, segment| full.join(segment))
    }
}

#[async_trait]
impl JobHandler for AssetSync {
    async fn handle(&self, path: &str, info: &PathInfo) -> Result<SyncOutcome> {
        self.upload_if_not_exists(path, info).await
    }
}

fn rfc3339(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}
