//! Embedded ledger backend
//!
//! Executes the lifecycle contract in-process, serializing transactions
//! under a lock the way the network serializes concurrent writes per key.
//! State is persisted as a JSON snapshot under the state directory so the
//! ledger survives process restarts. Timestamps and transaction ids are
//! assigned here, never by callers.

use crate::error::{AquaError, AquaResult};
use crate::ledger::client::{LedgerClient, SubmitReceipt};
use crate::ledger::contract::LifecycleContract;
use crate::model::FlagReason;
use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// In-process `LedgerClient` backed by the lifecycle contract
#[derive(Debug)]
pub struct EmbeddedLedger {
    contract: Mutex<LifecycleContract>,
    snapshot_path: Option<PathBuf>,
    org: String,
}

impl EmbeddedLedger {
    /// Create a volatile ledger with no snapshot persistence
    pub fn in_memory(org: impl Into<String>) -> Self {
        Self {
            contract: Mutex::new(LifecycleContract::new()),
            snapshot_path: None,
            org: org.into(),
        }
    }

    /// Open a ledger persisted at the given snapshot path
    ///
    /// Loads existing state when the snapshot exists, otherwise starts
    /// empty. A snapshot that fails to parse is an error, not a reset;
    /// the ledger must never silently drop committed state.
    pub async fn open(path: impl Into<PathBuf>, org: impl Into<String>) -> AquaResult<Self> {
        let path = path.into();
        let contract = Self::load_snapshot(&path).await?;
        Ok(Self {
            contract: Mutex::new(contract),
            snapshot_path: Some(path),
            org: org.into(),
        })
    }

    async fn load_snapshot(path: &Path) -> AquaResult<LifecycleContract> {
        if !path.exists() {
            debug!("No ledger snapshot at {}, starting empty", path.display());
            return Ok(LifecycleContract::new());
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| AquaError::io(format!("reading ledger snapshot {}", path.display()), e))?;

        serde_json::from_str(&content).map_err(|e| AquaError::LedgerSnapshotCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    async fn persist(&self, contract: &LifecycleContract) -> AquaResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AquaError::io("creating ledger state directory", e))?;
        }

        let content = serde_json::to_string_pretty(contract)?;
        fs::write(path, content)
            .await
            .map_err(|e| AquaError::io(format!("writing ledger snapshot {}", path.display()), e))?;

        Ok(())
    }

    /// Derive a transaction id for a committed operation
    fn tx_id(operation: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(Uuid::new_v4().as_bytes());
        hasher.update(operation.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn arg<'a>(args: &'a [String], index: usize, name: &str) -> AquaResult<&'a str> {
        args.get(index)
            .map(String::as_str)
            .ok_or_else(|| AquaError::validation(format!("missing argument: {name}")))
    }

    fn parse_unit_ids(raw: &str) -> AquaResult<Vec<String>> {
        serde_json::from_str(raw)
            .map_err(|_| AquaError::validation("unit ids must be a JSON array of strings"))
    }
}

#[async_trait]
impl LedgerClient for EmbeddedLedger {
    async fn submit(&self, operation: &str, args: &[String]) -> AquaResult<SubmitReceipt> {
        let timestamp = Utc::now().timestamp();
        let mut contract = self.contract.lock().await;

        let result = match operation {
            "RegisterBatch" => {
                let batch_id = Self::arg(args, 0, "batch id")?;
                let unit_ids = Self::parse_unit_ids(Self::arg(args, 1, "unit ids")?)?;
                serde_json::to_value(contract.register_batch(
                    batch_id, &unit_ids, timestamp, &self.org,
                )?)?
            }
            "ShipBatch" => {
                let batch_id = Self::arg(args, 0, "batch id")?;
                let destination = Self::arg(args, 1, "destination")?;
                let unit_ids = Self::parse_unit_ids(Self::arg(args, 2, "unit ids")?)?;
                serde_json::to_value(contract.ship_batch(
                    batch_id,
                    destination,
                    &unit_ids,
                    timestamp,
                    &self.org,
                )?)?
            }
            "ReceiveAtWarehouse" => {
                let unit_id = Self::arg(args, 0, "unit id")?;
                let warehouse_id = Self::arg(args, 1, "warehouse id")?;
                serde_json::to_value(contract.receive_at_warehouse(
                    unit_id,
                    warehouse_id,
                    timestamp,
                    &self.org,
                )?)?
            }
            "VerifyAtSite" => {
                let unit_id = Self::arg(args, 0, "unit id")?;
                let site_id = Self::arg(args, 1, "site id")?;
                let verifier_id = Self::arg(args, 2, "verifier id")?;
                serde_json::to_value(contract.verify_at_site(
                    unit_id,
                    site_id,
                    verifier_id,
                    timestamp,
                    &self.org,
                )?)?
            }
            "ReplaceUnit" => {
                let old_unit_id = Self::arg(args, 0, "old unit id")?;
                let new_unit_id = Self::arg(args, 1, "new unit id")?;
                let site_id = Self::arg(args, 2, "site id")?;
                serde_json::to_value(contract.replace_unit(
                    old_unit_id,
                    new_unit_id,
                    site_id,
                    timestamp,
                    &self.org,
                )?)?
            }
            "FlagLostDamaged" => {
                let unit_id = Self::arg(args, 0, "unit id")?;
                let reason: FlagReason = Self::arg(args, 1, "reason")?
                    .parse()
                    .map_err(AquaError::Validation)?;
                serde_json::to_value(contract.flag_lost_damaged(
                    unit_id, reason, timestamp, &self.org,
                )?)?
            }
            other => {
                return Err(AquaError::validation(format!(
                    "unknown contract operation: {other}"
                )))
            }
        };

        self.persist(&contract).await?;

        let tx_id = Self::tx_id(operation);
        info!("Committed {} as tx {}", operation, &tx_id[..12]);
        Ok(SubmitReceipt { tx_id, result })
    }

    async fn evaluate(&self, operation: &str, args: &[String]) -> AquaResult<serde_json::Value> {
        let contract = self.contract.lock().await;

        match operation {
            "ReadUnit" => {
                let unit_id = Self::arg(args, 0, "unit id")?;
                Ok(serde_json::to_value(contract.read_unit(unit_id)?)?)
            }
            other => Err(AquaError::validation(format!(
                "unknown contract query: {other}"
            ))),
        }
    }

    async fn close(&self) -> AquaResult<()> {
        let contract = self.contract.lock().await;
        self.persist(&contract).await?;
        debug!("Embedded ledger closed");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "embedded"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn register_args() -> Vec<String> {
        vec![
            "batch-2024-001".to_string(),
            r#"["b-2024-u-001","b-2024-u-002"]"#.to_string(),
        ]
    }

    #[tokio::test]
    async fn submit_and_read_back() {
        let ledger = EmbeddedLedger::in_memory("Org1MSP");

        let receipt = ledger.submit("RegisterBatch", &register_args()).await.unwrap();
        assert_eq!(receipt.tx_id.len(), 64);
        assert_eq!(receipt.result["unitCount"], 2);

        let view = ledger
            .evaluate("ReadUnit", &["b-2024-u-001".to_string()])
            .await
            .unwrap();
        assert_eq!(view["state"], "REGISTERED");
        assert_eq!(view["batchId"], "batch-2024-001");
        assert_eq!(view["org"], serde_json::Value::Null); // org lives on events
        assert_eq!(view["history"][0]["org"], "Org1MSP");
    }

    #[tokio::test]
    async fn contract_errors_propagate() {
        let ledger = EmbeddedLedger::in_memory("Org1MSP");
        ledger.submit("RegisterBatch", &register_args()).await.unwrap();

        let err = ledger
            .submit("RegisterBatch", &register_args())
            .await
            .unwrap_err();
        assert!(matches!(err, AquaError::Conflict(_)));

        let err = ledger
            .evaluate("ReadUnit", &["ghost".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AquaError::NotFound(_)));
    }

    #[tokio::test]
    async fn flag_reason_is_validated() {
        let ledger = EmbeddedLedger::in_memory("Org1MSP");
        ledger.submit("RegisterBatch", &register_args()).await.unwrap();

        let err = ledger
            .submit(
                "FlagLostDamaged",
                &["b-2024-u-001".to_string(), "BROKEN".to_string()],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AquaError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_operation_rejected() {
        let ledger = EmbeddedLedger::in_memory("Org1MSP");
        let err = ledger.submit("MintTokens", &[]).await.unwrap_err();
        assert!(matches!(err, AquaError::Validation(_)));
    }

    #[tokio::test]
    async fn tx_ids_are_unique() {
        let a = EmbeddedLedger::tx_id("RegisterBatch");
        let b = EmbeddedLedger::tx_id("RegisterBatch");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");

        let ledger = EmbeddedLedger::open(&path, "Org1MSP").await.unwrap();
        ledger.submit("RegisterBatch", &register_args()).await.unwrap();
        ledger.close().await.unwrap();

        let reopened = EmbeddedLedger::open(&path, "Org1MSP").await.unwrap();
        let view = reopened
            .evaluate("ReadUnit", &["b-2024-u-002".to_string()])
            .await
            .unwrap();
        assert_eq!(view["state"], "REGISTERED");
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "not json").unwrap();

        let err = EmbeddedLedger::open(&path, "Org1MSP").await.unwrap_err();
        assert!(matches!(err, AquaError::LedgerSnapshotCorrupt { .. }));
    }
}
