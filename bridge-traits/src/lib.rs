//! # Host Bridge Traits
//!
//! Capability traits the sync core requires from its host.
//!
//! ## Overview
//!
//! This crate defines the contract between the sync core and the concrete
//! adapters that talk to the network and the local disk. Each trait represents
//! a capability the core consumes but does not implement itself.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Single-attempt async HTTP with streamed file bodies
//! - [`KeyValueStore`](storage::KeyValueStore) - Durable key-value map backing the idempotency store
//! - [`StorageBackend`](storage::StorageBackend) - Byte transfer into remote object storage
//!
//! Desktop implementations of `HttpClient` and `KeyValueStore` live in
//! `bridge-desktop`; storage backends live in `provider-storage`.
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Implementations should convert library errors to `BridgeError` and keep
//! enough context (URL, status, key) for the log line that reports them.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single instance can be shared
//! behind an `Arc` by every worker task.

pub mod error;
pub mod http;
pub mod storage;

pub use error::BridgeError;

pub use http::{HttpBody, HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use storage::{KeyValueStore, StorageBackend, UploadTarget};
