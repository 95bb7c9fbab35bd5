//! # Catalog Provider
//!
//! Client for the remote asset catalog that local directories and files are
//! mirrored into.
//!
//! ## Overview
//!
//! This module provides:
//! - The [`CatalogClient`] trait consumed by the sync use cases
//! - [`HttpCatalogClient`], a JSON-over-HTTPS implementation on top of the
//!   `HttpClient` bridge
//! - Wire types for collections, assets, formats, file sets, files and storages

pub mod client;
pub mod connector;
pub mod error;
pub mod types;

pub use client::CatalogClient;
pub use connector::HttpCatalogClient;
pub use error::{CatalogError, Result};
pub use types::{
    Asset, CatalogFile, CloseFileRequest, Collection, FileSet, Format, KeyframesRequest,
    StorageDescriptor,
};
