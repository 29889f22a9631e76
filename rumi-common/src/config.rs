//! Configuration loading and resolution
//!
//! Every setting resolves in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The first two tiers are handled by the server's `clap` arguments, which
//! arrive here as [`ConfigOverrides`]. A missing or unreadable TOML file
//! is never fatal: it is logged and the defaults are used.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "RUMI_CONFIG";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5000;

/// Which [`crate::store::PoetryStore`] backend to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(Error::Config(format!(
                "Unknown storage backend '{}' (expected 'sqlite' or 'memory')",
                other
            ))),
        }
    }
}

/// `[server]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// `[storage]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_path: PathBuf,
    /// Insert the sample corpus when the store is empty
    pub seed_sample_data: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            database_path: default_database_path(),
            seed_sample_data: true,
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Whole config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub backend: Option<StorageBackend>,
    pub database_path: Option<PathBuf>,
    pub seed_sample_data: Option<bool>,
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Load the config file (if any) and apply overrides on top
    pub fn resolve(overrides: ConfigOverrides) -> Self {
        let mut config = match locate_config_file(overrides.config_path.as_deref()) {
            Some(path) => match Self::load(&path) {
                Ok(config) => {
                    info!("Loaded config file {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("{} - using defaults", e);
                    Self::default()
                }
            },
            None => {
                info!("No config file found - using defaults");
                Self::default()
            }
        };

        config.apply(overrides);
        config
    }

    fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(backend) = overrides.backend {
            self.storage.backend = backend;
        }
        if let Some(path) = overrides.database_path {
            self.storage.database_path = path;
        }
        if let Some(seed) = overrides.seed_sample_data {
            self.storage.seed_sample_data = seed;
        }
    }

    /// `host:port` to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Find the config file to read
///
/// Explicit path first, then `RUMI_CONFIG`, then the platform config
/// directory (`~/.config/rumi/config.toml` on Linux).
pub fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("rumi").join("config.toml"))
        .filter(|p| p.exists())
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("rumi"))
        .unwrap_or_else(|| PathBuf::from("./rumi_data"))
        .join("rumi.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            [storage]
            backend = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.storage.seed_sample_data);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_overrides_win() {
        let mut config = TomlConfig::default();
        config.apply(ConfigOverrides {
            port: Some(8080),
            backend: Some(StorageBackend::Memory),
            seed_sample_data: Some(false),
            ..Default::default()
        });

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(!config.storage.seed_sample_data);
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("SQLite".parse::<StorageBackend>().unwrap(), StorageBackend::Sqlite);
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!(matches!("redis".parse::<StorageBackend>(), Err(Error::Config(_))));
    }

    #[test]
    fn test_default_database_path_file_name() {
        assert!(default_database_path().ends_with("rumi.db"));
    }
}
