//! # Desktop Bridge Implementations
//!
//! Default implementations of the host bridge traits for desktop and server
//! platforms (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` with rustls, one attempt per call
//! - `KeyValueStore` using a SQLite database through `sqlx`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SqliteKeyValueStore};
//!
//! #[tokio::main]
//! async fn main() -> bridge_traits::error::Result<()> {
//!     let catalog_http = ReqwestHttpClient::catalog()?;
//!     let transfer_http = ReqwestHttpClient::transfer()?;
//!     let store = SqliteKeyValueStore::open_in("db".as_ref()).await?;
//!     Ok(())
//! }
//! ```

mod http;
mod kv_store;

pub use http::{HttpClientConfig, ReqwestHttpClient};
pub use kv_store::{SqliteKeyValueStore, DATABASE_FILE};
