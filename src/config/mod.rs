//! Configuration management for ccingest
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. `.env` file in the working directory (via dotenvy)
//! 4. System environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use ccingest::config::Config;
//!
//! let config = Config::load(None).expect("Failed to load configuration");
//! println!("Thingiverse endpoint: {}", config.thingiverse.endpoint);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `CCINGEST__<section>__<key>`
//!
//! Examples:
//! - `CCINGEST__HTTP__RETRIES=3`
//! - `CCINGEST__HTTP__REQUEST_DELAY=500ms`
//! - `CCINGEST__THINGIVERSE__PER_PAGE=50`
//!
//! The Thingiverse API token is only ever read from `THINGIVERSE_ACCESS_TOKEN`.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/ccingest.toml`.
//! This can be overridden using the `CCINGEST_CONFIG` environment variable
//! or the `--config` CLI flag.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{Config, HttpSettings, McCordSettings, ThingiverseSettings};
pub use validation::ValidationError;

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
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`CCINGEST__*`)
    /// 2. TOML file (`path`, else `CCINGEST_CONFIG`, else `config/ccingest.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - Validation fails (zero page sizes, bad URLs, etc.)
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path, without secrets
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
