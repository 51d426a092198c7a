//! Configuration management for pagegate
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use pagegate::config::Config;
//!
//! let config = Config::load(None).expect("Failed to load configuration");
//! let server = &config.server;
//! println!("Serving {} with {} slots", server.document_root.display(), server.capacity);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `PAGEGATE__<section>__<key>`
//!
//! Examples:
//! - `PAGEGATE__SERVER__CAPACITY=16`
//! - `PAGEGATE__SERVER__DOCUMENT_ROOT=/srv/www`
//! - `PAGEGATE__SERVER__MAX_REQUEST_BYTES=4KB`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/pagegate.toml`.
//! This can be overridden using the `PAGEGATE_CONFIG` environment variable
//! or the `--config` flag.

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{Config, ServerConfig};
pub use validation::{MAX_CAPACITY, ValidationError};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// `explicit` takes precedence over `PAGEGATE_CONFIG` when choosing the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or a value
    /// fails validation.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = sources::load(explicit)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Check values that may have been changed after loading
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }
}
