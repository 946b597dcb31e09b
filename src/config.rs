//! Configuration management for the fraud rules pipeline

use crate::dispatcher::DEFAULT_WORKERS;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Prefix for environment overrides, e.g. `FRAUD__PIPELINE__WORKERS=8`
pub const ENV_PREFIX: &str = "FRAUD";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// File the configuration was read from; `None` when running on defaults
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Synthetic batch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// Number of transactions to generate per run
    #[serde(default = "default_transactions")]
    pub transactions: usize,
}

fn default_transactions() -> usize {
    1000
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            transactions: default_transactions(),
        }
    }
}

/// Dispatcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of parallel workers
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_level")]
    pub level: String,
    /// Log format (pretty, json)
    #[serde(default)]
    pub format: LogFormat,
    /// Optional log file; logs go to stderr when unset
    #[serde(default)]
    pub file: Option<String>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path.
    ///
    /// A missing file falls back to defaults; `FRAUD__SECTION__KEY`
    /// environment variables override either.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_env_prefix(path, ENV_PREFIX)
    }

    /// Load from `path`, taking overrides from `<prefix>__SECTION__KEY`
    pub fn load_with_env_prefix<P: AsRef<Path>>(path: P, prefix: &str) -> Result<Self> {
        let path = path.as_ref();

        let config = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let mut app: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        app.source = path.exists().then(|| path.to_path_buf());
        Ok(app)
    }
}
