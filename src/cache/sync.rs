//! Cache synchronizer
//!
//! Projects committed ledger transactions into the local cache and repairs
//! the cache from authoritative reads. Projection runs after ledger commit,
//! outside the ledger's atomicity boundary: a failed cache write is logged
//! and counted, never surfaced to the caller of the originating write.
//!
//! The current-state row is a full replacement, so every attribute the
//! event does not set is carried forward from the existing row. `batchId`
//! in particular is set once at registration and must survive every
//! subsequent update.

use crate::cache::store::{CacheStore, CachedEvent, CachedUnit};
use crate::error::AquaResult;
use crate::ledger::contract::UnitView;
use crate::model::EventKind;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Event type recorded on a row first materialized by read-repair
const READ_REPAIR_EVENT: &str = "READ";

/// Projects ledger results into the local cache store
pub struct CacheSynchronizer {
    store: CacheStore,
    dropped: AtomicU64,
}

impl CacheSynchronizer {
    /// Create a synchronizer over the given store
    pub fn new(store: CacheStore) -> Self {
        Self {
            store,
            dropped: AtomicU64::new(0),
        }
    }

    /// Number of projections dropped because the cache write failed
    ///
    /// Staleness must be observable, not silent.
    pub fn dropped_projections(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Project one committed transition for one unit
    ///
    /// Never fails: the ledger write is already durable, so a projection
    /// failure is logged and counted instead of propagating.
    pub fn project(
        &self,
        kind: EventKind,
        unit_id: &str,
        tx_id: &str,
        result: &serde_json::Value,
        org: &str,
    ) {
        if let Err(e) = self.try_project(kind, unit_id, tx_id, result, org) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            warn!("Cache projection failed for {unit_id} (tx {tx_id}): {e}");
        }
    }

    /// Project one committed transition for several units
    pub fn project_many(
        &self,
        kind: EventKind,
        unit_ids: &[String],
        tx_id: &str,
        result: &serde_json::Value,
        org: &str,
    ) {
        for unit_id in unit_ids {
            self.project(kind, unit_id, tx_id, result, org);
        }
    }

    fn try_project(
        &self,
        kind: EventKind,
        unit_id: &str,
        tx_id: &str,
        result: &serde_json::Value,
        org: &str,
    ) -> AquaResult<()> {
        let ts = result
            .get("timestamp")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or_else(|| Utc::now().timestamp());

        self.store.insert_event(&CachedEvent {
            tx_id: tx_id.to_string(),
            unit_id: unit_id.to_string(),
            event_type: kind.as_str().to_string(),
            ts,
            org: Some(org.to_string()),
            status: "COMMITTED".to_string(),
            metadata: Some(result.clone()),
        })?;

        let existing = self.store.get_unit(unit_id)?;
        let carried = |field: &str, prior: Option<&str>| -> Option<String> {
            result
                .get(field)
                .and_then(serde_json::Value::as_str)
                .or(prior)
                .map(String::from)
        };

        let row = CachedUnit {
            unit_id: unit_id.to_string(),
            state: kind.resulting_state().as_str().to_string(),
            batch_id: carried("batchId", existing.as_ref().and_then(|u| u.batch_id.as_deref())),
            site_id: carried("siteId", existing.as_ref().and_then(|u| u.site_id.as_deref())),
            warehouse_id: carried(
                "warehouseId",
                existing.as_ref().and_then(|u| u.warehouse_id.as_deref()),
            ),
            verifier_id: carried(
                "verifierId",
                existing.as_ref().and_then(|u| u.verifier_id.as_deref()),
            ),
            last_ts: ts,
            last_event_type: kind.as_str().to_string(),
        };
        self.store.upsert_unit(&row)?;

        debug!("Projected {} for {unit_id} (tx {tx_id})", kind.as_str());
        Ok(())
    }

    /// Repair the cached row from an authoritative ledger read
    ///
    /// The ledger's values win unconditionally; only the current-state
    /// projection is touched, never the event log. Returns whether the
    /// cache was rewritten. Failures are swallowed like projections;
    /// a broken cache must not fail a successful ledger read.
    pub fn reconcile(&self, view: &UnitView) -> bool {
        match self.try_reconcile(view) {
            Ok(repaired) => repaired,
            Err(e) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Cache reconciliation failed for {}: {e}", view.unit_id);
                false
            }
        }
    }

    fn try_reconcile(&self, view: &UnitView) -> AquaResult<bool> {
        let existing = self.store.get_unit(&view.unit_id)?;

        if let Some(row) = &existing {
            let consistent = row.state == view.state.as_str()
                && row.batch_id.as_deref() == Some(view.batch_id.as_str())
                && row.site_id == view.site_id
                && row.warehouse_id == view.warehouse_id
                && row.verifier_id == view.verifier_id;
            if consistent {
                return Ok(false);
            }
        }

        let last_event_type = existing
            .as_ref()
            .map(|u| u.last_event_type.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| READ_REPAIR_EVENT.to_string());

        self.store.upsert_unit(&CachedUnit {
            unit_id: view.unit_id.clone(),
            state: view.state.as_str().to_string(),
            batch_id: Some(view.batch_id.clone()),
            site_id: view.site_id.clone(),
            warehouse_id: view.warehouse_id.clone(),
            verifier_id: view.verifier_id.clone(),
            last_ts: view.last_updated,
            last_event_type,
        })?;

        info!("Repaired cache for {} from ledger read", view.unit_id);
        Ok(true)
    }
}
