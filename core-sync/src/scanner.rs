//! # Scanner
//!
//! Periodic discovery feed over the scan root.
//!
//! ## Overview
//!
//! Each pass walks the tree below the scan root in pre-order, sorted by file
//! name:
//! - Directories are mirrored inline through [`CollectionSync`], so a parent
//!   is always tracked before anything below it is processed
//! - Files are submitted to the worker pool's job queue
//!
//! The first pass runs as soon as the scanner starts; later passes follow at
//! a fixed interval. A pass that overruns the interval delays the next one.
//! Unreadable entries and symbolic links are logged and skipped.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::collection::CollectionSync;
use crate::error::{Result, SyncError};
use crate::job::{Job, OutstandingJobs};
use crate::path::{relative_path, PathInfo};

/// Counts for one scan pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub directories: usize,
    pub files: usize,
    pub skipped: usize,
}

/// One entry found by the walk
#[derive(Debug)]
struct Discovered {
    relative_path: String,
    info: PathInfo,
}

/// Capacity of the channel between the blocking walk and the async side
const WALK_BUFFER: usize = 256;

pub struct Scanner {
    root: PathBuf,
    interval: Duration,
    collections: Arc<CollectionSync>,
    jobs: mpsc::Sender<Job>,
    outstanding: OutstandingJobs,
    cancel: CancellationToken,
}

impl Scanner {
    pub fn new(
        root: impl Into<PathBuf>,
        interval: Duration,
        collections: Arc<CollectionSync>,
        jobs: mpsc::Sender<Job>,
        outstanding: OutstandingJobs,
    ) -> Self {
        Self {
            root: root.into(),
            interval,
            collections,
            jobs,
            outstanding,
            cancel: CancellationToken::new(),
        }
    }

    /// Run one pass over the tree
    ///
    /// Returns early, without error, once the scanner is stopped.
    pub async fn scan(&self) -> Result<ScanStats> {
        let mut stats = ScanStats::default();
        let (tx, mut rx) = mpsc::channel(WALK_BUFFER);

        let root = self.root.clone();
        let walker = tokio::task::spawn_blocking(move || walk(&root, tx));

        while let Some(found) = rx.recv().await {
            if self.cancel.is_cancelled() {
                debug!("Scan interrupted");
                break;
            }

            let Discovered {
                relative_path,
                info,
            } = match found {
                Ok(found) => found,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    stats.skipped += 1;
                    continue;
                }
            };

            if info.is_dir {
                stats.directories += 1;
                if let Err(e) = self.collections.sync_directory(&relative_path, &info).await {
                    error!(path = %relative_path, error = %e, "Failed to create collection");
                }
                continue;
            }

            stats.files += 1;
            debug!(path = %relative_path, "Found a file");
            let job = Job::new(relative_path, info, self.outstanding.ticket());

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!("Scan interrupted");
                    break;
                }
                sent = self.jobs.send(job) => {
                    if sent.is_err() {
                        return Err(SyncError::PoolClosed);
                    }
                }
            }
        }

        // Dropping the receiver ends an interrupted walk at its next entry.
        drop(rx);
        walker
            .await
            .map_err(|e| SyncError::Scan(format!("walk task failed: {}", e)))?;

        info!(
            files = stats.files,
            directories = stats.directories,
            skipped = stats.skipped,
            "Scan finished"
        );
        Ok(stats)
    }

    /// Spawn the periodic scan loop
    pub fn start(self) -> ScannerHandle {
        let cancel = self.cancel.clone();
        let outstanding = self.outstanding.clone();

        info!(root = %self.root.display(), interval_secs = self.interval.as_secs(), "Starting scanner");
        let task = tokio::spawn(self.run());

        ScannerHandle {
            cancel,
            outstanding,
            task,
        }
    }

    async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if let Err(e) = self.scan().await {
                error!(root = %self.root.display(), error = %e, "Scan failed");
            }
        }

        debug!("Stopped the scanner");
    }
}

/// Running scanner
pub struct ScannerHandle {
    cancel: CancellationToken,
    outstanding: OutstandingJobs,
    task: JoinHandle<()>,
}

impl ScannerHandle {
    /// Stop scanning and wait until every submitted job has completed
    pub async fn stop(self) {
        info!("Stopping the scanner");
        self.cancel.cancel();

        if let Err(e) = self.task.await {
            warn!(error = %e, "Scanner task ended abnormally");
        }

        self.outstanding.wait_idle().await;
        info!("All submitted jobs completed");
    }
}

/// Blocking walk below `root`, streaming entries until the receiver goes away
fn walk(root: &Path, tx: mpsc::Sender<std::result::Result<Discovered, SyncError>>) {
    let entries = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in entries {
        let found = entry
            .map_err(|e| SyncError::InvalidPath {
                path: e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string()),
                reason: e.to_string(),
            })
            .and_then(|entry| discovered(root, &entry));

        if tx.blocking_send(found).is_err() {
            return;
        }
    }
}

fn discovered(root: &Path, entry: &walkdir::DirEntry) -> Result<Discovered> {
    let relative_path = relative_path(root, entry.path())?;
    if entry.path_is_symlink() {
        return Err(SyncError::InvalidPath {
            path: relative_path,
            reason: "symbolic links are not synced".to_string(),
        });
    }

    let metadata = entry.metadata().map_err(|e| SyncError::InvalidPath {
        path: relative_path.clone(),
        reason: e.to_string(),
    })?;

    let name = entry.file_name().to_string_lossy().into_owned();
    Ok(Discovered {
        relative_path,
        info: PathInfo::from_metadata(name, &metadata),
    })
}
