//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod storage;

pub use storage::{SqliteConfig, StorageConfig, StorageType};

use serde::Deserialize;

use crate::utils::retry::ConflictRetryConfig;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "stride.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "STRIDE_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "STRIDE";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "STRIDE_LOG";

/// Balance below which a student is flagged for renewal.
pub const DEFAULT_LOW_BALANCE_THRESHOLD: u32 = 5;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Ledger engine configuration.
    pub ledger: LedgerConfig,
    /// Lead pipeline configuration.
    pub pipeline: PipelineConfig,
}

/// Ledger engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Students with fewer remaining credits are reported as low balance.
    pub low_balance_threshold: u32,
    /// Backoff for re-reading and re-applying after a version conflict.
    pub conflict_retry: ConflictRetryConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            low_balance_threshold: DEFAULT_LOW_BALANCE_THRESHOLD,
            conflict_retry: ConflictRetryConfig::default(),
        }
    }
}

/// Lead pipeline configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Backoff for re-reading and re-applying after a version conflict.
    pub conflict_retry: ConflictRetryConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `stride.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        Ok(config)
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self::default()
    }
}
