//! Sync service façade and bootstrap helpers.
//!
//! This crate wires the bridge implementations (HTTP, key-value store) and
//! the catalog and storage providers into the sync pipeline, and owns the
//! order in which it is started and stopped.

pub mod error;

pub use error::{Result, ServiceError};

use std::sync::Arc;

use bridge_desktop::{ReqwestHttpClient, SqliteKeyValueStore};
use bridge_traits::storage::KeyValueStore;
use core_runtime::SyncConfig;
use core_sync::{
    AssetSync, CollectionSync, OutstandingJobs, Scanner, ScannerHandle, SyncError, TrackedStore,
    WorkerPool,
};
use provider_catalog::{CatalogClient, HttpCatalogClient, StorageDescriptor};
use provider_storage::StorageBackends;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

/// Aggregated handle to everything the pipeline talks to.
pub struct ServiceDependencies {
    pub catalog: Arc<dyn CatalogClient>,
    pub key_value_store: Arc<dyn KeyValueStore>,
    pub backends: StorageBackends,
}

impl ServiceDependencies {
    /// Construct a dependency bundle from explicit handles.
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        key_value_store: Arc<dyn KeyValueStore>,
        backends: StorageBackends,
    ) -> Self {
        Self {
            catalog,
            key_value_store,
            backends,
        }
    }

    /// Real HTTP clients and the SQLite store under the configured data directory.
    pub async fn desktop(config: &SyncConfig) -> Result<Self> {
        let catalog_http = Arc::new(ReqwestHttpClient::catalog()?);
        let transfer_http = Arc::new(ReqwestHttpClient::transfer()?);
        let key_value_store = Arc::new(SqliteKeyValueStore::open_in(&config.data_dir).await?);

        let catalog = Arc::new(HttpCatalogClient::new(
            catalog_http,
            config.catalog_url.clone(),
            config.app_id.clone(),
            config.auth_token.clone(),
        ));

        Ok(Self::new(
            catalog,
            key_value_store,
            StorageBackends::new(transfer_http),
        ))
    }
}

/// Running sync pipeline: scanner, worker pool and tracking store.
pub struct SyncService {
    scanner: ScannerHandle,
    pool: WorkerPool,
    key_value_store: Arc<dyn KeyValueStore>,
    storage: Arc<StorageDescriptor>,
}

impl SyncService {
    /// Fetch the storage descriptor, then start the worker pool and the scanner.
    ///
    /// Fails before anything is started if the scan directory is missing, the
    /// storage cannot be fetched, or its method is not supported.
    #[instrument(skip_all, fields(storage_id = %config.storage_id))]
    pub async fn start(config: &SyncConfig, deps: ServiceDependencies) -> Result<Self> {
        let storage = match Self::prepare(config, &deps).await {
            Ok(storage) => Arc::new(storage),
            Err(e) => {
                if let Err(close) = deps.key_value_store.close().await {
                    warn!(error = %close, "Failed to close key-value store");
                }
                return Err(e);
            }
        };

        let store = TrackedStore::new(Arc::clone(&deps.key_value_store));
        let assets = AssetSync::new(
            &config.scan_dir,
            Arc::clone(&deps.catalog),
            store.clone(),
            Arc::clone(&storage),
            deps.backends,
        );
        let collections = CollectionSync::new(deps.catalog, store);

        let (jobs_tx, jobs_rx) = mpsc::channel(config.workers.max(1));
        let pool = WorkerPool::start(config.workers, jobs_rx, Arc::new(assets));
        let scanner = Scanner::new(
            &config.scan_dir,
            config.scan_interval,
            Arc::new(collections),
            jobs_tx,
            OutstandingJobs::new(),
        )
        .start();

        info!(workers = pool.worker_count(), "Sync service started");
        Ok(Self {
            scanner,
            pool,
            key_value_store: deps.key_value_store,
            storage,
        })
    }

    async fn prepare(config: &SyncConfig, deps: &ServiceDependencies) -> Result<StorageDescriptor> {
        if !config.scan_dir.is_dir() {
            return Err(ServiceError::InitializationFailed(format!(
                "scan directory {} does not exist or is not a directory",
                config.scan_dir.display()
            )));
        }

        let storage = deps.catalog.get_storage(&config.storage_id).await?;
        deps.backends
            .resolve(&storage.method)
            .map_err(SyncError::from)?;

        info!(
            storage = %storage.name,
            method = %storage.method,
            "Using storage"
        );
        Ok(storage)
    }

    /// Storage receiving the uploaded bytes
    pub fn storage(&self) -> &StorageDescriptor {
        &self.storage
    }

    /// Stop scanning, wait for every submitted job, then stop the workers and close the store.
    pub async fn shutdown(self) -> Result<()> {
        info!("Shutting down sync service");

        self.scanner.stop().await;
        self.pool.stop().await;
        self.key_value_store.close().await?;

        info!("Sync service stopped");
        Ok(())
    }
}

/// Build the desktop dependencies for `config` and start the service.
pub async fn bootstrap(config: &SyncConfig) -> Result<SyncService> {
    let deps = ServiceDependencies::desktop(config).await?;
    SyncService::start(config, deps).await
}
