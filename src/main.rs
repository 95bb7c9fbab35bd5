//! catalog-sync - mirrors a local directory tree into a remote asset catalog.
//!
//! # Usage
//!
//! ```bash
//! # Everything from flags
//! catalog-sync --scan-dir /media/incoming --app-id <id> --auth-token <token> \
//!     --storage-id <storage>
//!
//! # Settings from a TOML file, secrets from the environment
//! CATALOG_SYNC_AUTH_TOKEN=<token> catalog-sync --config catalog-sync.toml
//! ```
//!
//! Values are layered: the config file first, then environment variables and
//! flags. `RUST_LOG` overrides the log filter.

use anyhow::{Context, Result};
use clap::Parser;
use core_runtime::{init_logging, ConfigFile, LogFormat, LogLevel, SyncConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "catalog-sync")]
#[command(about = "Mirror a local directory tree into a remote asset catalog", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML config file
    #[arg(long, env = "CATALOG_SYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Directory to scan for files
    #[arg(long, env = "CATALOG_SYNC_SCAN_DIR")]
    scan_dir: Option<PathBuf>,

    /// Seconds between the starts of two scans
    #[arg(long, env = "CATALOG_SYNC_SCAN_INTERVAL")]
    scan_interval: Option<u64>,

    /// Number of concurrent upload workers
    #[arg(long, env = "CATALOG_SYNC_WORKERS")]
    workers: Option<usize>,

    /// Catalog base URL
    #[arg(long, env = "CATALOG_SYNC_CATALOG_URL")]
    catalog_url: Option<String>,

    /// Catalog application id
    #[arg(long, env = "CATALOG_SYNC_APP_ID")]
    app_id: Option<String>,

    /// Catalog auth token
    #[arg(long, env = "CATALOG_SYNC_AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// Storage receiving uploaded bytes
    #[arg(long, env = "CATALOG_SYNC_STORAGE_ID")]
    storage_id: Option<String>,

    /// Directory for the local tracking database
    #[arg(long, env = "CATALOG_SYNC_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CATALOG_SYNC_LOG_LEVEL")]
    log_level: Option<LogLevel>,

    /// Log format (pretty, json, compact)
    #[arg(long, env = "CATALOG_SYNC_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

impl Cli {
    fn into_config(self) -> Result<SyncConfig> {
        let mut builder = SyncConfig::builder();

        if let Some(path) = &self.config {
            let file = ConfigFile::load(path)?;
            builder = builder.apply_file(file);
        }

        if let Some(scan_dir) = self.scan_dir {
            builder = builder.scan_dir(scan_dir);
        }
        if let Some(secs) = self.scan_interval {
            builder = builder.scan_interval(Duration::from_secs(secs));
        }
        if let Some(workers) = self.workers {
            builder = builder.workers(workers);
        }
        if let Some(url) = self.catalog_url {
            builder = builder.catalog_url(url);
        }
        if let Some(app_id) = self.app_id {
            builder = builder.app_id(app_id);
        }
        if let Some(token) = self.auth_token {
            builder = builder.auth_token(token);
        }
        if let Some(storage_id) = self.storage_id {
            builder = builder.storage_id(storage_id);
        }
        if let Some(data_dir) = self.data_dir {
            builder = builder.data_dir(data_dir);
        }
        if let Some(level) = self.log_level {
            builder = builder.log_level(level);
        }
        if let Some(format) = self.log_format {
            builder = builder.log_format(format);
        }

        Ok(builder.build()?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Cli::parse()
        .into_config()
        .context("invalid configuration")?;

    let mut logging = config.logging();
    if let Ok(filter) = std::env::var("RUST_LOG") {
        logging = logging.with_filter(filter);
    }
    init_logging(logging).context("failed to initialise logging")?;

    info!(config = ?config, "Starting catalog-sync");
    let service = core_service::bootstrap(&config)
        .await
        .context("failed to start the sync service")?;

    let signal = shutdown_signal().await?;
    info!(signal, "Got signal");

    service.shutdown().await?;
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            Ok("SIGINT")
        }
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}
