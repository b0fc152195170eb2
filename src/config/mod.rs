//! Configuration management for Aquatrace

pub mod schema;

pub use schema::Config;

use crate::error::{AquaError, AquaResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Project-local config file name, discovered by walking up from the cwd
const LOCAL_CONFIG_FILE: &str = ".aquatrace.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aquatrace")
            .join("config.toml")
    }

    /// Get the state directory path
    ///
    /// `AQUATRACE_STATE_DIR` overrides the platform default so tests and
    /// deployments can isolate their ledger snapshot and cache.
    pub fn state_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os("AQUATRACE_STATE_DIR") {
            return PathBuf::from(dir);
        }
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aquatrace")
    }

    /// Get the cache database path
    pub fn cache_db_path() -> PathBuf {
        Self::state_dir().join("cache.db")
    }

    /// Get the embedded ledger snapshot path
    pub fn ledger_snapshot_path() -> PathBuf {
        Self::state_dir().join("ledger.json")
    }

    /// Get the audit log path
    pub fn audit_log_path() -> PathBuf {
        Self::state_dir().join("audit.log")
    }

    /// Find a project-local config by walking up from the given directory
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        let mut dir = Some(start);
        while let Some(current) = dir {
            let candidate = current.join(LOCAL_CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            dir = current.parent();
        }
        None
    }

    /// Load configuration, creating default if not exists
    pub async fn load(&self) -> AquaResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration with an optional project-local overlay
    ///
    /// Local values win over global ones, section by section; sections the
    /// local file omits keep their global values.
    pub async fn load_merged(&self, local: Option<&Path>) -> AquaResult<Config> {
        let global = self.load().await?;

        let Some(local_path) = local else {
            return Ok(global);
        };

        let content = fs::read_to_string(local_path).await.map_err(|e| {
            AquaError::io(format!("reading local config {}", local_path.display()), e)
        })?;
        let local_value: toml::Value =
            content.parse().map_err(|e: toml::de::Error| AquaError::ConfigInvalid {
                path: local_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut merged: toml::Value = toml::Value::try_from(&global)?;
        merge_toml(&mut merged, local_value);

        merged.try_into().map_err(|e: toml::de::Error| AquaError::ConfigInvalid {
            path: local_path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> AquaResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| AquaError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| AquaError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> AquaResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            AquaError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> AquaResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AquaError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Ensure the state directory exists
    pub async fn ensure_state_dirs() -> AquaResult<()> {
        let dir = Self::state_dir();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| AquaError::io(format!("creating directory {}", dir.display()), e))?;
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively merge `overlay` into `base`; overlay scalars win
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
