// File: src/config.rs
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "VOCAB_PICKER_CONFIG";
const APP_DIR: &str = "archaeo-vocab";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML from {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PickerConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl PickerConfig {
    /// Reads the config file if there is one, otherwise returns defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = resolve_config_path();
        if config_path.exists() {
            return Self::from_file(&config_path);
        }
        Ok(PickerConfig::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

fn resolve_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return Path::new(&path).to_path_buf();
    }

    if let Some(base) = dirs::config_dir() {
        return base.join(APP_DIR).join("config.toml");
    }

    Path::new("vocab_picker.toml").to_path_buf()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .map(|base| base.join(APP_DIR).join("vocabulary.bin"))
        .unwrap_or_else(|| PathBuf::from("vocabulary.bin"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    #[serde(default = "default_key")]
    pub default_key: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_candidates: default_max_candidates(),
            default_key: default_key(),
        }
    }
}

fn default_max_candidates() -> usize {
    10
}

fn default_key() -> String {
    "siteName".to_string()
}
