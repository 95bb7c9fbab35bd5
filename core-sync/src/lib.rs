//! # Sync Module
//!
//! Mirrors a local directory tree into the remote catalog.
//!
//! ## Overview
//!
//! Directories become collections and files become assets with uploaded
//! bytes. Every synced path gets a durable local record, and a path with a
//! completed record is never submitted again.
//!
//! ## Components
//!
//! - **Idempotency Store** (`store`): path-keyed [`TrackedEntry`] records over the key-value bridge
//! - **Collection Sync** (`collection`): one catalog collection per directory
//! - **Asset Sync** (`asset`): the multi-step asset, format, file set, file, upload, close workflow
//! - **Retry** (`retry`): whole-attempt retry with exponential backoff for byte transfers
//! - **Worker Pool** (`pool`, `worker`): bounded-concurrency job execution
//! - **Scanner** (`scanner`): periodic walk feeding directories and files into the above

pub mod asset;
pub mod collection;
pub mod entry;
pub mod error;
pub mod job;
pub mod path;
pub mod pool;
pub mod retry;
pub mod scanner;
pub mod store;
mod worker;

pub use asset::{AssetSync, SyncOutcome};
pub use collection::CollectionSync;
pub use entry::{EntryKind, EntryStatus, TrackedEntry};
pub use error::{Result, SyncError};
pub use job::{Job, JobHandler, JobTicket, OutstandingJobs};
pub use path::PathInfo;
pub use pool::WorkerPool;
pub use retry::{RetryError, RetryPolicy};
pub use scanner::{ScanStats, Scanner, ScannerHandle};
pub use store::TrackedStore;
