//! Error types for the catalog provider

use thiserror::Error;

/// Catalog provider errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog answered with a non-2xx status
    #[error("Catalog API error (status {status_code}): {message}")]
    Api { status_code: u16, message: String },

    /// Failed to parse an API response
    #[error("Failed to parse API response: {0}")]
    Parse(String),

    /// Transport failure below the HTTP status level
    #[error(transparent)]
    Bridge(#[from] bridge_traits::error::BridgeError),
}

impl CatalogError {
    /// HTTP status returned by the catalog, if the request got that far
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;
