//! Lifecycle gateway
//!
//! Orchestrates every lifecycle operation: validate inputs, build the
//! ledger transaction, submit it through the injected client, then project
//! the committed result into the local cache. Reads go to the ledger and
//! repair the cache on the way back. Cache queries never touch the ledger.
//!
//! Batch receive fans out into independent per-unit submissions, so the
//! outcome carries per-unit success and failure lists; the operation as a
//! whole fails only when no unit succeeded.

use crate::audit::AuditLog;
use crate::cache::{CacheStats, CacheStore, CacheSynchronizer, CachedEvent, CachedUnit};
use crate::error::{AquaError, AquaResult};
use crate::ledger::client::LedgerClient;
use crate::ledger::contract::{
    FlagReceipt, ReceiveReceipt, RegisterReceipt, ReplaceReceipt, ShipReceipt, UnitView,
    VerifyReceipt,
};
use crate::model::{EventKind, FlagReason};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

static BATCH_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^batch-\d{4}-\d{3,}$").expect("valid batch id pattern"));
static UNIT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^b-\d{4}-u-\d{3,}$").expect("valid unit id pattern"));

/// Outcome of a committed registration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOutcome {
    pub tx_id: String,
    pub batch_id: String,
    pub unit_count: usize,
    pub timestamp: i64,
}

/// Outcome of a committed shipment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipOutcome {
    pub tx_id: String,
    pub batch_id: String,
    pub destination: String,
    pub unit_count: usize,
    pub timestamp: i64,
}

/// One successful unit within a receive fan-out
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedUnit {
    pub unit_id: String,
    pub tx_id: String,
    pub warehouse_id: String,
    pub timestamp: i64,
}

/// One failed unit within a receive fan-out
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitFailure {
    pub unit_id: String,
    pub error: String,
}

/// Aggregate outcome of a receive fan-out: partial success is normal
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveOutcome {
    pub batch_id: Option<String>,
    pub unit_count: usize,
    pub results: Vec<ReceivedUnit>,
    pub errors: Vec<UnitFailure>,
}

/// Outcome of a committed verification
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOutcome {
    pub tx_id: String,
    pub unit_id: String,
    pub site_id: String,
    pub verifier_id: String,
    pub timestamp: i64,
}

/// Outcome of a committed replacement
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceOutcome {
    pub tx_id: String,
    pub old_unit_id: String,
    pub new_unit_id: String,
    pub site_id: String,
    pub timestamp: i64,
}

/// Outcome of a committed flag
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagOutcome {
    pub tx_id: String,
    pub unit_id: String,
    pub reason: FlagReason,
    pub timestamp: i64,
}

/// Gateway between callers, the authoritative ledger and the local cache
pub struct LifecycleGateway {
    ledger: Arc<dyn LedgerClient>,
    store: CacheStore,
    sync: CacheSynchronizer,
    audit: AuditLog,
    org: String,
}

impl LifecycleGateway {
    /// Create a gateway over an injected ledger client and cache store
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        store: CacheStore,
        audit: AuditLog,
        org: impl Into<String>,
    ) -> Self {
        let sync = CacheSynchronizer::new(store.clone());
        Self {
            ledger,
            store,
            sync,
            audit,
            org: org.into(),
        }
    }

    /// Register a batch of new units on the ledger
    pub async fn register(
        &self,
        batch_id: &str,
        unit_ids: &[String],
    ) -> AquaResult<RegisterOutcome> {
        validate_batch_id(batch_id)?;
        if unit_ids.is_empty() {
            return Err(AquaError::validation("at least one unit id is required"));
        }
        for unit_id in unit_ids {
            validate_unit_id(unit_id)?;
        }

        let args = vec![batch_id.to_string(), serde_json::to_string(unit_ids)?];
        let receipt = self.submit("RegisterBatch", &args, unit_ids).await?;
        let result: RegisterReceipt = serde_json::from_value(receipt.result.clone())?;

        self.sync.project_many(
            EventKind::Registered,
            unit_ids,
            &receipt.tx_id,
            &receipt.result,
            &self.org,
        );

        Ok(RegisterOutcome {
            tx_id: receipt.tx_id,
            batch_id: result.batch_id,
            unit_count: result.unit_count,
            timestamp: result.timestamp,
        })
    }

    /// Ship a batch to a destination
    ///
    /// When `unit_ids` is empty the batch membership is resolved from the
    /// local cache, so the caller only names the batch.
    pub async fn ship(
        &self,
        batch_id: &str,
        destination: &str,
        unit_ids: &[String],
    ) -> AquaResult<ShipOutcome> {
        validate_batch_id(batch_id)?;
        if destination.is_empty() {
            return Err(AquaError::validation("destination is required"));
        }

        let unit_ids = if unit_ids.is_empty() {
            self.resolve_batch_units(batch_id)?
        } else {
            unit_ids.to_vec()
        };
        for unit_id in &unit_ids {
            validate_unit_id(unit_id)?;
        }

        let args = vec![
            batch_id.to_string(),
            destination.to_string(),
            serde_json::to_string(&unit_ids)?,
        ];
        let receipt = self.submit("ShipBatch", &args, &unit_ids).await?;
        let result: ShipReceipt = serde_json::from_value(receipt.result.clone())?;

        self.sync.project_many(
            EventKind::Shipped,
            &unit_ids,
            &receipt.tx_id,
            &receipt.result,
            &self.org,
        );

        Ok(ShipOutcome {
            tx_id: receipt.tx_id,
            batch_id: result.batch_id,
            destination: result.destination,
            unit_count: result.unit_count,
            timestamp: result.timestamp,
        })
    }

    /// Receive units at a warehouse, by batch or by single unit
    ///
    /// Fans out one ledger call per unit. Units that fail leave the rest
    /// of the batch unaffected; the whole operation fails only when no
    /// unit succeeded, surfacing the first unit's error.
    pub async fn receive(
        &self,
        batch_id: Option<&str>,
        unit_id: Option<&str>,
        warehouse_id: &str,
    ) -> AquaResult<ReceiveOutcome> {
        if warehouse_id.is_empty() {
            return Err(AquaError::validation("warehouse id is required"));
        }

        let unit_ids = match (batch_id, unit_id) {
            (Some(batch), _) => {
                validate_batch_id(batch)?;
                self.resolve_batch_units(batch)?
            }
            (None, Some(unit)) => {
                validate_unit_id(unit)?;
                vec![unit.to_string()]
            }
            (None, None) => {
                return Err(AquaError::validation(
                    "either a batch id or a unit id is required",
                ))
            }
        };

        let mut results = Vec::new();
        let mut errors = Vec::new();
        let mut first_error: Option<AquaError> = None;

        for unit in &unit_ids {
            let args = vec![unit.clone(), warehouse_id.to_string()];
            match self.submit("ReceiveAtWarehouse", &args, std::slice::from_ref(unit)).await {
                Ok(receipt) => {
                    let result: ReceiveReceipt = serde_json::from_value(receipt.result.clone())?;
                    self.sync.project(
                        EventKind::Received,
                        unit,
                        &receipt.tx_id,
                        &receipt.result,
                        &self.org,
                    );
                    results.push(ReceivedUnit {
                        unit_id: result.unit_id,
                        tx_id: receipt.tx_id,
                        warehouse_id: result.warehouse_id,
                        timestamp: result.timestamp,
                    });
                }
                Err(e) => {
                    warn!("Receive failed for {unit}: {e}");
                    errors.push(UnitFailure {
                        unit_id: unit.clone(),
                        error: e.to_string(),
                    });
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if results.is_empty() {
            return Err(first_error
                .unwrap_or_else(|| AquaError::Internal("receive produced no outcome".into())));
        }

        Ok(ReceiveOutcome {
            batch_id: batch_id.map(String::from),
            unit_count: results.len(),
            results,
            errors,
        })
    }

    /// Verify a received unit's delivery at a site
    pub async fn verify(
        &self,
        unit_id: &str,
        site_id: &str,
        verifier_id: &str,
    ) -> AquaResult<VerifyOutcome> {
        validate_unit_id(unit_id)?;
        if site_id.is_empty() || verifier_id.is_empty() {
            return Err(AquaError::validation(
                "site id and verifier id are required",
            ));
        }

        let args = vec![
            unit_id.to_string(),
            site_id.to_string(),
            verifier_id.to_string(),
        ];
        let units = vec![unit_id.to_string()];
        let receipt = self.submit("VerifyAtSite", &args, &units).await?;
        let result: VerifyReceipt = serde_json::from_value(receipt.result.clone())?;

        self.sync.project(
            EventKind::Verified,
            unit_id,
            &receipt.tx_id,
            &receipt.result,
            &self.org,
        );

        Ok(VerifyOutcome {
            tx_id: receipt.tx_id,
            unit_id: result.unit_id,
            site_id: result.site_id,
            verifier_id: result.verifier_id,
            timestamp: result.timestamp,
        })
    }

    /// Replace a verified unit with a pre-registered one
    ///
    /// One atomic dual-unit ledger call; both units are projected from the
    /// same transaction.
    pub async fn replace(
        &self,
        old_unit_id: &str,
        new_unit_id: &str,
        site_id: &str,
    ) -> AquaResult<ReplaceOutcome> {
        validate_unit_id(old_unit_id)?;
        validate_unit_id(new_unit_id)?;
        if site_id.is_empty() {
            return Err(AquaError::validation("site id is required"));
        }

        let args = vec![
            old_unit_id.to_string(),
            new_unit_id.to_string(),
            site_id.to_string(),
        ];
        let units = vec![old_unit_id.to_string(), new_unit_id.to_string()];
        let receipt = self.submit("ReplaceUnit", &args, &units).await?;
        let result: ReplaceReceipt = serde_json::from_value(receipt.result.clone())?;

        self.sync.project(
            EventKind::Replaced,
            old_unit_id,
            &receipt.tx_id,
            &receipt.result,
            &self.org,
        );
        self.sync.project(
            EventKind::Verified,
            new_unit_id,
            &receipt.tx_id,
            &receipt.result,
            &self.org,
        );

        Ok(ReplaceOutcome {
            tx_id: receipt.tx_id,
            old_unit_id: result.old_unit_id,
            new_unit_id: result.new_unit_id,
            site_id: result.site_id,
            timestamp: result.timestamp,
        })
    }

    /// Flag a unit as lost or damaged
    pub async fn flag(&self, unit_id: &str, reason: FlagReason) -> AquaResult<FlagOutcome> {
        validate_unit_id(unit_id)?;

        let args = vec![unit_id.to_string(), reason.as_str().to_string()];
        let units = vec![unit_id.to_string()];
        let receipt = self.submit("FlagLostDamaged", &args, &units).await?;
        let result: FlagReceipt = serde_json::from_value(receipt.result.clone())?;

        self.sync.project(
            EventKind::Flagged,
            unit_id,
            &receipt.tx_id,
            &receipt.result,
            &self.org,
        );

        Ok(FlagOutcome {
            tx_id: receipt.tx_id,
            unit_id: result.unit_id,
            reason: result.reason,
            timestamp: result.timestamp,
        })
    }

    /// Read a unit's authoritative snapshot, repairing the cache on the way
    pub async fn read(&self, unit_id: &str) -> AquaResult<UnitView> {
        validate_unit_id(unit_id)?;

        let value = self
            .ledger
            .evaluate("ReadUnit", &[unit_id.to_string()])
            .await?;
        let view: UnitView = serde_json::from_value(value)?;
        self.sync.reconcile(&view);

        Ok(view)
    }

    /// List the most recent events from the local cache
    pub fn recent_events(&self, limit: u32) -> AquaResult<Vec<CachedEvent>> {
        self.store.recent_events(limit)
    }

    /// List one unit's events from the local cache, oldest first
    pub fn unit_events(&self, unit_id: &str) -> AquaResult<Vec<CachedEvent>> {
        validate_unit_id(unit_id)?;
        self.store.unit_events(unit_id)
    }

    /// Search cached units by substring across id fields
    pub fn search(&self, query: &str, limit: u32) -> AquaResult<Vec<CachedUnit>> {
        if query.is_empty() {
            return Err(AquaError::validation("search query is required"));
        }
        self.store.search_units(query, limit)
    }

    /// List cached units sharing a batch id
    pub fn units_in_batch(&self, batch_id: &str) -> AquaResult<Vec<CachedUnit>> {
        validate_batch_id(batch_id)?;
        self.store.units_by_batch(batch_id)
    }

    /// Aggregate statistics from the local cache
    pub fn stats(&self) -> AquaResult<CacheStats> {
        self.store.stats()
    }

    /// Projections dropped since startup; non-zero means the cache is stale
    pub fn dropped_projections(&self) -> u64 {
        self.sync.dropped_projections()
    }

    /// Close the underlying ledger client
    pub async fn close(&self) -> AquaResult<()> {
        self.ledger.close().await
    }

    fn resolve_batch_units(&self, batch_id: &str) -> AquaResult<Vec<String>> {
        let units = self.store.units_by_batch(batch_id)?;
        if units.is_empty() {
            return Err(AquaError::NotFound(format!(
                "no units found for batch {batch_id}, register the batch first"
            )));
        }
        Ok(units.into_iter().map(|u| u.unit_id).collect())
    }

    async fn submit(
        &self,
        operation: &str,
        args: &[String],
        unit_ids: &[String],
    ) -> AquaResult<crate::ledger::client::SubmitReceipt> {
        match self.ledger.submit(operation, args).await {
            Ok(receipt) => {
                self.audit.committed(operation, &receipt.tx_id, unit_ids).await;
                Ok(receipt)
            }
            Err(e) => {
                self.audit.rejected(operation, &e.to_string()).await;
                Err(e)
            }
        }
    }
}

fn validate_batch_id(batch_id: &str) -> AquaResult<()> {
    if !BATCH_ID_RE.is_match(batch_id) {
        return Err(AquaError::validation(format!(
            "batch id {batch_id} does not match batch-YYYY-NNN"
        )));
    }
    Ok(())
}

fn validate_unit_id(unit_id: &str) -> AquaResult<()> {
    if !UNIT_ID_RE.is_match(unit_id) {
        return Err(AquaError::validation(format!(
            "unit id {unit_id} does not match b-YYYY-u-NNN"
        )));
    }
    Ok(())
}
