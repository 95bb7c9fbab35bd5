//! # Sync Configuration Module
//!
//! Provides configuration management for the catalog sync service.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `SyncConfig`
//! instance holding every setting the service needs. It enforces fail-fast
//! validation so a missing credential or directory is reported at startup
//! instead of on the first upload.
//!
//! ## Sources
//!
//! Values are layered in increasing precedence:
//!
//! 1. Built-in defaults
//! 2. A TOML file ([`ConfigFile`])
//! 3. Environment variables and command-line flags, applied by the binary
//!    through the builder setters
//!
//! ## Required Parameters
//!
//! - `scanner.directory` - Root of the tree to mirror
//! - `catalog.app_id` / `catalog.auth_token` - Catalog credentials
//! - `catalog.storage_id` - Storage that receives the uploaded bytes
//! - `store.data_dir` - Directory holding the local tracking database
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{ConfigFile, SyncConfig};
//!
//! let file = ConfigFile::load("catalog-sync.toml")?;
//! let config = SyncConfig::builder()
//!     .apply_file(file)
//!     .workers(8)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! The builder names the missing parameter in its error message:
//!
//! ```should_panic
//! use core_runtime::config::SyncConfig;
//!
//! let config = SyncConfig::builder()
//!     .scan_dir("/srv/media")
//!     .build()
//!     .expect("missing required parameter: catalog.app_id");
//! ```

use crate::error::{Error, Result};
use crate::logging::{redact_if_sensitive, LogFormat, LogLevel, LoggingConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default time between the starts of two consecutive scans
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(10);

/// Default number of concurrent asset uploads
pub const DEFAULT_WORKERS: usize = 5;

/// Default catalog base URL
pub const DEFAULT_CATALOG_URL: &str = "https://app.iconik.io";

/// Default directory for the local tracking database
pub const DEFAULT_DATA_DIR: &str = "db";

/// Validated service configuration.
///
/// Use [`SyncConfigBuilder`] to construct instances.
#[derive(Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Root of the local tree to mirror
    pub scan_dir: PathBuf,

    /// Time between the starts of two consecutive scans
    pub scan_interval: Duration,

    /// Maximum number of asset uploads running at once (always >= 1)
    pub workers: usize,

    /// Catalog base URL without a trailing slash
    pub catalog_url: String,

    /// Catalog application id (`App-ID` header)
    pub app_id: String,

    /// Catalog auth token (`Auth-Token` header)
    pub auth_token: String,

    /// Identifier of the storage receiving uploaded bytes
    pub storage_id: String,

    /// Directory holding the local tracking database
    pub data_dir: PathBuf,

    /// Minimum log level
    pub log_level: LogLevel,

    /// Log output format
    pub log_format: LogFormat,
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("scan_dir", &self.scan_dir)
            .field("scan_interval", &self.scan_interval)
            .field("workers", &self.workers)
            .field("catalog_url", &self.catalog_url)
            .field("app_id", &self.app_id)
            .field("auth_token", &redact_if_sensitive("auth_token", &self.auth_token))
            .field("storage_id", &self.storage_id)
            .field("data_dir", &self.data_dir)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl SyncConfig {
    /// Creates a new builder for constructing a `SyncConfig`.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Logging settings derived from this configuration
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig::default()
            .with_level(self.log_level)
            .with_format(self.log_format)
    }
}

/// Builder for [`SyncConfig`].
///
/// Setters may be called in any order; later calls win. Required values are
/// checked in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct SyncConfigBuilder {
    scan_dir: Option<PathBuf>,
    scan_interval: Option<Duration>,
    workers: Option<usize>,
    catalog_url: Option<String>,
    app_id: Option<String>,
    auth_token: Option<String>,
    storage_id: Option<String>,
    data_dir: Option<PathBuf>,
    log_level: Option<LogLevel>,
    log_format: Option<LogFormat>,
}

impl SyncConfigBuilder {
    /// Sets the directory to mirror.
    pub fn scan_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.scan_dir = Some(path.into());
        self
    }

    /// Sets the time between consecutive scan starts.
    pub fn scan_interval(mut self, interval: Duration) -> Self {
        self.scan_interval = Some(interval);
        self
    }

    /// Sets the worker count. Zero is clamped to one.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn catalog_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_url = Some(url.into());
        self
    }

    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn storage_id(mut self, storage_id: impl Into<String>) -> Self {
        self.storage_id = Some(storage_id.into());
        self
    }

    /// Sets the directory holding the tracking database.
    pub fn data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.log_format = Some(format);
        self
    }

    /// Layers every value present in `file` over the current builder state.
    pub fn apply_file(mut self, file: ConfigFile) -> Self {
        if let Some(scanner) = file.scanner {
            if let Some(directory) = scanner.directory {
                self.scan_dir = Some(directory);
            }
            if let Some(secs) = scanner.interval_secs {
                self.scan_interval = Some(Duration::from_secs(secs));
            }
        }

        if let Some(workers) = file.uploader.and_then(|uploader| uploader.workers) {
            self.workers = Some(workers);
        }

        if let Some(catalog) = file.catalog {
            if catalog.url.is_some() {
                self.catalog_url = catalog.url;
            }
            if catalog.app_id.is_some() {
                self.app_id = catalog.app_id;
            }
            if catalog.auth_token.is_some() {
                self.auth_token = catalog.auth_token;
            }
            if catalog.storage_id.is_some() {
                self.storage_id = catalog.storage_id;
            }
        }

        if let Some(data_dir) = file.store.and_then(|store| store.data_dir) {
            self.data_dir = Some(data_dir);
        }

        if let Some(logging) = file.logging {
            if logging.level.is_some() {
                self.log_level = logging.level;
            }
            if logging.format.is_some() {
                self.log_format = logging.format;
            }
        }

        self
    }

    /// Validates the collected values and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first missing or invalid parameter.
    pub fn build(self) -> Result<SyncConfig> {
        let scan_dir = self
            .scan_dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or_else(|| missing("scanner.directory"))?;

        let app_id = required(self.app_id, "catalog.app_id")?;
        let auth_token = required(self.auth_token, "catalog.auth_token")?;
        let storage_id = required(self.storage_id, "catalog.storage_id")?;

        let data_dir = self
            .data_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        if data_dir.as_os_str().is_empty() {
            return Err(missing("store.data_dir"));
        }

        let scan_interval = self.scan_interval.unwrap_or(DEFAULT_SCAN_INTERVAL);
        if scan_interval.is_zero() {
            return Err(Error::Config(
                "scanner.interval must be greater than zero".to_string(),
            ));
        }

        let catalog_url = self
            .catalog_url
            .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());
        let catalog_url = catalog_url.trim().trim_end_matches('/').to_string();
        if !(catalog_url.starts_with("http://") || catalog_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "catalog.url must be an http(s) URL, got '{}'",
                catalog_url
            )));
        }

        Ok(SyncConfig {
            scan_dir,
            scan_interval,
            workers: self.workers.unwrap_or(DEFAULT_WORKERS).max(1),
            catalog_url,
            app_id,
            auth_token,
            storage_id,
            data_dir,
            log_level: self.log_level.unwrap_or_default(),
            log_format: self.log_format.unwrap_or_default(),
        })
    }
}

fn missing(parameter: &str) -> Error {
    Error::Config(format!("missing required parameter: {}", parameter))
}

fn required(value: Option<String>, parameter: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| missing(parameter))
}

/// On-disk TOML configuration.
///
/// Every field is optional; absent values fall through to the defaults or to
/// higher-precedence sources.
///
/// ```toml
/// [scanner]
/// directory = "/srv/media"
/// interval_secs = 30
///
/// [uploader]
/// workers = 8
///
/// [catalog]
/// url = "https://app.iconik.io"
/// app_id = "..."
/// auth_token = "..."
/// storage_id = "..."
///
/// [store]
/// data_dir = "/var/lib/catalog-sync"
///
/// [logging]
/// level = "debug"
/// format = "json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub scanner: Option<ScannerSection>,
    pub uploader: Option<UploaderSection>,
    pub catalog: Option<CatalogSection>,
    pub store: Option<StoreSection>,
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScannerSection {
    pub directory: Option<PathBuf>,
    pub interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploaderSection {
    pub workers: Option<usize>,
}

#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSection {
    pub url: Option<String>,
    pub app_id: Option<String>,
    pub auth_token: Option<String>,
    pub storage_id: Option<String>,
}

impl std::fmt::Debug for CatalogSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSection")
            .field("url", &self.url)
            .field("app_id", &self.app_id)
            .field(
                "auth_token",
                &self
                    .auth_token
                    .as_deref()
                    .map(|token| redact_if_sensitive("auth_token", token)),
            )
            .field("storage_id", &self.storage_id)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<LogLevel>,
    pub format: Option<LogFormat>,
}

impl ConfigFile {
    /// Parse a TOML document
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Read and parse the TOML file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        toml::from_str(&contents).map_err(|e| Error::ConfigFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
