//! YAML configuration with environment-variable overrides.
//!
//! Precedence, low to high: built-in defaults, the YAML file on disk, then
//! `VECFS_*` environment variables (`.env` loaded first via `dotenvy`, so a
//! `.env` entry and a real environment variable are indistinguishable by the
//! time overrides apply).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VecfsError};
use crate::sparse::DEFAULT_SPARSE_THRESHOLD;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("./vecfs-data.jsonl"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbedderConfig {
    pub provider: String,
    pub model: String,
    pub threshold: f64,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            provider: "hashing".to_string(),
            model: "default".to_string(),
            threshold: DEFAULT_SPARSE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub embedder: EmbedderConfig,
}

impl Config {
    /// Default config file location: `~/.vecfs/config.yaml`, falling back to
    /// `./vecfs-config.yaml` if the home directory cannot be resolved.
    pub fn path() -> PathBuf {
        match dirs::home_dir() {
            Some(home) => home.join(".vecfs").join("config.yaml"),
            None => PathBuf::from("./vecfs-config.yaml"),
        }
    }

    /// Load `.env`, then the YAML file at `path` (if it exists), then apply
    /// `VECFS_*` environment overrides. A missing file is not an error — the
    /// built-in defaults apply as if an empty document were found.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(VecfsError::Io)?;
            serde_yaml::from_str(&raw)
                .map_err(|e| VecfsError::Config(format!("invalid config YAML: {e}")))?
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Convenience wrapper over [`Config::load_from_path`] using [`Config::path`].
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::path())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("VECFS_FILE") {
            self.storage.file = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("VECFS_EMBEDDER_PROVIDER") {
            self.embedder.provider = v;
        }
        if let Ok(v) = std::env::var("VECFS_EMBEDDER_MODEL") {
            self.embedder.model = v;
        }
        if let Ok(v) = std::env::var("VECFS_EMBEDDER_THRESHOLD") {
            match v.parse::<f64>() {
                Ok(t) => self.embedder.threshold = t,
                Err(_) => {
                    tracing::warn!(
                        value = %v,
                        "VECFS_EMBEDDER_THRESHOLD is not a valid number, ignoring override"
                    );
                }
            }
        }
    }
}
