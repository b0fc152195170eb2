//! Configuration schema for Aquatrace
//!
//! Configuration is stored at `~/.config/aquatrace/config.toml`, with an
//! optional project-local `.aquatrace.toml` overlay.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Ledger backend settings
    pub ledger: LedgerConfig,

    /// Local cache settings
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,

    /// Enable audit logging of ledger submissions
    pub audit_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
            audit_log: true,
        }
    }
}

/// Ledger backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Organization recorded as the submitting actor on every event
    pub org: String,

    /// Snapshot file for the embedded backend (defaults to the state dir)
    pub snapshot_path: Option<PathBuf>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            org: "Org1MSP".to_string(),
            snapshot_path: None,
        }
    }
}

/// Local cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache database file (defaults to the state dir)
    pub db_path: Option<PathBuf>,

    /// Default number of events returned by recency queries
    pub recent_limit: u32,

    /// Maximum rows returned by unit search
    pub search_limit: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            recent_limit: 25,
            search_limit: 50,
        }
    }
}
