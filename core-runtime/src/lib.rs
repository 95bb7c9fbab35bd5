//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the catalog sync service:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! This crate contains the runtime utilities every other crate depends on.
//! It establishes the logging conventions and the validated configuration
//! that the service is assembled from.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{ConfigFile, SyncConfig, SyncConfigBuilder};
pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
