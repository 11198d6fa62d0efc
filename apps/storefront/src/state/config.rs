//! # Store Configuration
//!
//! Configuration loaded once at startup.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_ORDER_PREFIX=PQ                                         │
//! │     STOREFRONT_DB_PATH=./storefront.db                                 │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │     ~/Library/Application Support/com.storefront.shop/… (macOS)        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     prefix "PQ", billing country "UK"                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! store_name = "Paving & Quarry Tiles"
//! order_prefix = "PQ"
//! default_billing_country = "UK"
//! database_path = "/var/lib/storefront/storefront.db"
//! ```
//!
//! Read-only after startup, so no lock.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use storefront_core::order::validate_prefix;
use storefront_core::{DEFAULT_BILLING_COUNTRY, DEFAULT_ORDER_PREFIX};

const CONFIG_FILE_NAME: &str = "storefront.toml";
const DATABASE_FILE_NAME: &str = "storefront.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Shown in CLI output.
    pub store_name: String,

    /// Leading segment of every order number (`PQ` in `PQ-20241`).
    pub order_prefix: String,

    /// Billing country used when the checkout form leaves it blank.
    pub default_billing_country: String,

    /// SQLite file. `None` means the platform data directory.
    pub database_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            store_name: "Storefront".to_string(),
            order_prefix: DEFAULT_ORDER_PREFIX.to_string(),
            default_billing_country: DEFAULT_BILLING_COUNTRY.to_string(),
            database_path: None,
        }
    }
}

impl StoreConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(?path, "Loading store config from file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        validate_prefix(&self.order_prefix)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.default_billing_country.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_billing_country must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Applies `STOREFRONT_*` overrides read through `lookup`.
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prefix) = lookup("STOREFRONT_ORDER_PREFIX") {
            debug!(prefix = %prefix, "Overriding order prefix from environment");
            self.order_prefix = prefix;
        }

        if let Some(country) = lookup("STOREFRONT_BILLING_COUNTRY") {
            self.default_billing_country = country;
        }

        if let Some(path) = lookup("STOREFRONT_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(name) = lookup("STOREFRONT_STORE_NAME") {
            self.store_name = name;
        }
    }

    /// The configured database file, or `storefront.db` in the platform
    /// data directory (created if missing).
    pub fn resolve_database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let dirs = Self::project_dirs().ok_or_else(|| {
            ConfigError::Invalid("Could not determine app data directory".into())
        })?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::Read {
            path: data_dir.to_path_buf(),
            source,
        })?;

        Ok(data_dir.join(DATABASE_FILE_NAME))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "storefront", "shop")
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}
