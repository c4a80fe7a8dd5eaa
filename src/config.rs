use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::directory::config::{AssetsConfig, ResolverConfig};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub resolver: ResolverConfig,
    pub data: DataConfig,
    pub assets: AssetsConfig,
}

/// Data directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
    /// Database file name inside the data directory.
    pub database_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            database_file: "campus_directory.db".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/campus-directory/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => Self::from_toml_or_default(&contents, &config_path),
            Err(_) => {
                log::debug!(
                    "No config file at {}, using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    fn from_toml_or_default(contents: &str, origin: &std::path::Path) -> Self {
        match toml::from_str(contents) {
            Ok(config) => {
                log::info!("Loaded config from {}", origin.display());
                config
            }
            Err(e) => {
                log::warn!(
                    "Failed to parse config at {}: {e}, using defaults",
                    origin.display()
                );
                Self::default()
            }
        }
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data
            .data_dir
            .clone()
            .unwrap_or_else(|| {
                dirs::data_dir()
                    .map(|d| d.join("campus-directory"))
                    .unwrap_or_else(|| PathBuf::from("data"))
            })
    }

    /// Directory for rolling log files.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("campus-directory").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
