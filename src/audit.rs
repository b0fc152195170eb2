//! Audit logging for ledger submissions
//!
//! Writes JSON lines to the state directory's `audit.log`. On by default:
//! every committed transaction and every rejected submission leaves a
//! local trace alongside the ledger's own record.

use crate::config::{schema::Config, ConfigManager};
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// File-based audit logger that appends JSON lines
pub struct AuditLog {
    enabled: bool,
    path: PathBuf,
}

impl AuditLog {
    /// Create a new audit logger from config
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.general.audit_log,
            path: ConfigManager::audit_log_path(),
        }
    }

    /// Record a committed submission
    pub async fn committed(&self, operation: &str, tx_id: &str, unit_ids: &[String]) {
        self.log(
            "ledger.committed",
            &serde_json::json!({
                "operation": operation,
                "txId": tx_id,
                "unitIds": unit_ids,
            }),
        )
        .await;
    }

    /// Record a rejected submission
    pub async fn rejected(&self, operation: &str, error: &str) {
        self.log(
            "ledger.rejected",
            &serde_json::json!({
                "operation": operation,
                "error": error,
            }),
        )
        .await;
    }

    /// Log an audit event as a JSON line
    ///
    /// Silently drops events on IO failure — audit logging must never
    /// block or fail the submission it describes.
    pub async fn log(&self, event: &str, data: &serde_json::Value) {
        if !self.enabled {
            return;
        }

        let entry = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event": event,
            "data": data,
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize audit event: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write audit log: {}", e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
