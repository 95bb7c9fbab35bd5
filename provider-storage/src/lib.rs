//! # Storage Provider
//!
//! Byte-transfer protocols for the object storages a catalog can front.
//!
//! ## Overview
//!
//! Each backend implements the [`StorageBackend`] bridge trait for one
//! storage method:
//! - [`B2Backend`] - checksummed direct upload (`B2`)
//! - [`GcsBackend`] - two-phase resumable upload (`GCS`)
//! - [`S3Backend`] - presigned `PUT` (`S3`)
//!
//! [`StorageBackends`] holds one instance of each and resolves them by the
//! method name reported in the catalog's storage descriptor. File bodies are
//! streamed from disk by the underlying `HttpClient`.
//!
//! Backends make exactly one attempt per call; retrying is up to the caller.

pub mod b2;
pub mod gcs;
pub mod hash;
pub mod s3;

use bridge_traits::error::{BridgeError, Result};
use bridge_traits::http::HttpClient;
use bridge_traits::storage::StorageBackend;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

pub use b2::B2Backend;
pub use gcs::GcsBackend;
pub use s3::S3Backend;

/// Storage method name the catalog reports for a storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageMethod {
    Gcs,
    S3,
    B2,
}

impl StorageMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gcs => "GCS",
            Self::S3 => "S3",
            Self::B2 => "B2",
        }
    }
}

impl fmt::Display for StorageMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The method name matched none of `GCS`, `S3` or `B2`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported storage method: {0:?}")]
pub struct UnsupportedStorageMethod(pub String);

impl FromStr for StorageMethod {
    type Err = UnsupportedStorageMethod;

    /// Exact, case-sensitive match
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "GCS" => Ok(Self::Gcs),
            "S3" => Ok(Self::S3),
            "B2" => Ok(Self::B2),
            other => Err(UnsupportedStorageMethod(other.to_string())),
        }
    }
}

/// One backend per supported storage method
#[derive(Clone)]
pub struct StorageBackends {
    gcs: Arc<dyn StorageBackend>,
    s3: Arc<dyn StorageBackend>,
    b2: Arc<dyn StorageBackend>,
}

impl StorageBackends {
    /// Real backends sharing one transfer client
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            gcs: Arc::new(GcsBackend::new(Arc::clone(&http_client))),
            s3: Arc::new(S3Backend::new(Arc::clone(&http_client))),
            b2: Arc::new(B2Backend::new(http_client)),
        }
    }

    /// Explicit backend per method
    pub fn from_parts(
        gcs: Arc<dyn StorageBackend>,
        s3: Arc<dyn StorageBackend>,
        b2: Arc<dyn StorageBackend>,
    ) -> Self {
        Self { gcs, s3, b2 }
    }

    /// The same backend for every method
    pub fn uniform(backend: Arc<dyn StorageBackend>) -> Self {
        Self::from_parts(Arc::clone(&backend), Arc::clone(&backend), backend)
    }

    pub fn get(&self, method: StorageMethod) -> Arc<dyn StorageBackend> {
        match method {
            StorageMethod::Gcs => Arc::clone(&self.gcs),
            StorageMethod::S3 => Arc::clone(&self.s3),
            StorageMethod::B2 => Arc::clone(&self.b2),
        }
    }

    /// Look up the backend for a method name as reported by the catalog
    pub fn resolve(
        &self,
        method: &str,
    ) -> std::result::Result<Arc<dyn StorageBackend>, UnsupportedStorageMethod> {
        Ok(self.get(method.parse()?))
    }
}

impl fmt::Debug for StorageBackends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageBackends").finish_non_exhaustive()
    }
}

/// Current size of the file at `path`
pub(crate) async fn file_len(path: &Path) -> Result<u64> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        BridgeError::OperationFailed(format!("Failed to stat {}: {}", path.display(), e))
    })?;
    Ok(metadata.len())
}
