use provider_catalog::CatalogError;
use provider_storage::UnsupportedStorageMethod;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Transfer failed after {attempts} attempts: {message}")]
    Transfer { attempts: u32, message: String },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Worker pool is closed")]
    PoolClosed,

    #[error("Scan task failed: {0}")]
    Scan(String),
}

impl From<UnsupportedStorageMethod> for SyncError {
    fn from(error: UnsupportedStorageMethod) -> Self {
        Self::Configuration(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
