//! Configuration management and validation.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `CSV2JSON_*` environment variables. Command-line flags are applied last by
//! the CLI.
//!
//! ```toml
//! [conversion]
//! column_policy = "pad"
//!
//! [storage]
//! backend = "directory"
//! directory = "/var/lib/csv2json"
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::adapters::directory_store::DirectoryStore;
use crate::app::models::ColumnPolicy;
use crate::app::services::converter::Converter;
use crate::app::storage::Storage;
use crate::constants::{
    APP_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_LOG_LEVEL, ENV_COLUMN_POLICY, ENV_LOG_LEVEL,
    ENV_STORE_DIR,
};
use crate::{Error, Result};

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub conversion: ConversionConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Handling of rows whose width differs from the header
    pub column_policy: ColumnPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Root of the directory store; required when `backend = "directory"`
    pub directory: Option<PathBuf>,
}

/// Which store converted batches go to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Convert only, nothing is persisted
    #[default]
    None,
    /// One JSON file per batch under `storage.directory`
    Directory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// `<config dir>/csv2json/config.toml` for the current platform
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| Error::configuration("Could not determine the user config directory"))
    }

    /// Parse a TOML config file; missing sections take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read config file {}", path.display()), e))?;
        toml::from_str(&content).map_err(|e| {
            Error::configuration(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    /// Defaults, then `config_file` if given, then the process environment
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => {
                debug!("Loading config file {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `CSV2JSON_*` overrides obtained through `lookup`
    ///
    /// Empty values are ignored. Setting the store directory also selects the
    /// directory backend.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(dir) = lookup(ENV_STORE_DIR) {
            debug!("{} overrides the store directory", ENV_STORE_DIR);
            self.storage.backend = StorageBackend::Directory;
            self.storage.directory = Some(PathBuf::from(dir));
        }
        if let Some(policy) = lookup(ENV_COLUMN_POLICY) {
            self.conversion.column_policy = policy.parse()?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level.trim().to_ascii_lowercase();
        }
        Ok(())
    }

    /// Persist batches under `dir`
    pub fn with_store_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage.backend = StorageBackend::Directory;
        self.storage.directory = Some(dir.into());
        self
    }

    /// Convert only, regardless of earlier layers
    pub fn without_storage(mut self) -> Self {
        self.storage.backend = StorageBackend::None;
        self
    }

    pub fn with_column_policy(mut self, policy: ColumnPolicy) -> Self {
        self.conversion.column_policy = policy;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.backend == StorageBackend::Directory && self.storage.directory.is_none() {
            return Err(Error::configuration(
                "storage.backend is 'directory' but storage.directory is not set",
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(Error::configuration(format!(
                "Unknown log level '{}'. Expected one of: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Build the storage capability selected by this configuration
    pub fn open_storage(&self) -> Result<Storage> {
        match (self.storage.backend, &self.storage.directory) {
            (StorageBackend::None, _) => Ok(Storage::Unconfigured),
            (StorageBackend::Directory, Some(dir)) => {
                Ok(Storage::configured(DirectoryStore::open(dir)?))
            }
            (StorageBackend::Directory, None) => Err(Error::configuration(
                "No store directory configured",
            )),
        }
    }

    /// A converter wired with this configuration's storage and column policy
    pub fn converter(&self) -> Result<Converter> {
        Ok(Converter::new(self.open_storage()?).with_column_policy(self.conversion.column_policy))
    }
}
