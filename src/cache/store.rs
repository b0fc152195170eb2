//! Local cache store backed by SQLite
//!
//! Two tables: `units` holds the current-state projection (one row per
//! unit, fully replaced on every update) and `events` holds the
//! append-only event log, keyed by (txId, unitId) so replaying a
//! transaction overwrites its own rows instead of duplicating them, and
//! a dual-unit replace keeps both rows.
//!
//! The cache is a derived, best-effort replica. It is never the source of
//! truth; the ledger is.

use crate::error::{AquaError, AquaResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Current-state projection of one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedUnit {
    pub unit_id: String,
    pub state: String,
    pub batch_id: Option<String>,
    pub site_id: Option<String>,
    pub warehouse_id: Option<String>,
    pub verifier_id: Option<String>,
    pub last_ts: i64,
    pub last_event_type: String,
}

/// One committed transition in the event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedEvent {
    pub tx_id: String,
    pub unit_id: String,
    pub event_type: String,
    pub ts: i64,
    pub org: Option<String>,
    pub status: String,
    pub metadata: Option<serde_json::Value>,
}

/// Aggregate statistics over the cached fleet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub total_units: i64,
    pub total_events: i64,
    pub state_counts: BTreeMap<String, i64>,
    pub event_type_counts: BTreeMap<String, i64>,
    pub verified_count: i64,
    pub replaced_count: i64,
    pub lost_damaged_count: i64,
    /// Units that reached the field: verified + replaced
    pub verified_deliveries: i64,
    /// replaced / (verified + replaced) as a percentage, 0 when undefined
    pub replacement_compliance: f64,
}

/// SQLite-backed local cache store
#[derive(Clone)]
pub struct CacheStore {
    conn: Arc<Mutex<Connection>>,
}

impl CacheStore {
    /// Open (and initialize) the cache database at the given path
    pub fn open(path: &Path) -> AquaResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AquaError::io("creating cache directory", e))?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| AquaError::CacheWrite(format!("opening cache db: {e}")))?;
        Self::init_schema(&conn)?;

        debug!("Cache store opened at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a volatile in-memory cache
    pub fn in_memory() -> AquaResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AquaError::CacheWrite(format!("opening in-memory cache: {e}")))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> AquaResult<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS events (
                txId TEXT NOT NULL,
                unitId TEXT NOT NULL,
                eventType TEXT NOT NULL,
                ts INTEGER NOT NULL,
                org TEXT,
                status TEXT DEFAULT 'COMMITTED',
                metadata TEXT,
                PRIMARY KEY (txId, unitId)
            );
            CREATE TABLE IF NOT EXISTS units (
                unitId TEXT PRIMARY KEY,
                state TEXT NOT NULL,
                batchId TEXT,
                siteId TEXT,
                warehouseId TEXT,
                verifierId TEXT,
                lastTs INTEGER NOT NULL,
                lastEventType TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_events_unitId ON events(unitId);
            CREATE INDEX IF NOT EXISTS idx_events_ts ON events(ts DESC);
            CREATE INDEX IF NOT EXISTS idx_units_state ON units(state);
            CREATE INDEX IF NOT EXISTS idx_units_batchId ON units(batchId);",
        )
        .map_err(|e| AquaError::CacheWrite(format!("initializing cache schema: {e}")))
    }

    fn lock(&self) -> AquaResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AquaError::CacheWrite("cache connection lock poisoned".to_string()))
    }

    /// Insert or fully replace a unit's current-state row
    pub fn upsert_unit(&self, unit: &CachedUnit) -> AquaResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO units
                (unitId, state, batchId, siteId, warehouseId, verifierId, lastTs, lastEventType)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                unit.unit_id,
                unit.state,
                unit.batch_id,
                unit.site_id,
                unit.warehouse_id,
                unit.verifier_id,
                unit.last_ts,
                unit.last_event_type,
            ],
        )
        .map_err(|e| AquaError::CacheWrite(format!("upserting unit {}: {e}", unit.unit_id)))?;
        Ok(())
    }

    /// Append an event row, overwriting a replayed (txId, unitId) pair
    pub fn insert_event(&self, event: &CachedEvent) -> AquaResult<()> {
        let metadata = event
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO events
                (txId, unitId, eventType, ts, org, status, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.tx_id,
                event.unit_id,
                event.event_type,
                event.ts,
                event.org,
                event.status,
                metadata,
            ],
        )
        .map_err(|e| AquaError::CacheWrite(format!("inserting event {}: {e}", event.tx_id)))?;
        Ok(())
    }

    /// Fetch one unit's current-state row
    pub fn get_unit(&self, unit_id: &str) -> AquaResult<Option<CachedUnit>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT unitId, state, batchId, siteId, warehouseId, verifierId, lastTs, lastEventType
             FROM units WHERE unitId = ?1",
            params![unit_id],
            Self::unit_from_row,
        )
        .optional()
        .map_err(|e| AquaError::CacheQuery(format!("fetching unit {unit_id}: {e}")))
    }

    /// List the N most recent events across all units, newest first
    pub fn recent_events(&self, limit: u32) -> AquaResult<Vec<CachedEvent>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT txId, unitId, eventType, ts, org, status, metadata
                 FROM events ORDER BY ts DESC, txId LIMIT ?1",
            )
            .map_err(|e| AquaError::CacheQuery(format!("preparing recent events: {e}")))?;

        let rows = stmt
            .query_map(params![limit], Self::event_from_row)
            .map_err(|e| AquaError::CacheQuery(format!("listing recent events: {e}")))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| AquaError::CacheQuery(format!("reading recent events: {e}")))
    }

    /// List all events for one unit in chronological order
    pub fn unit_events(&self, unit_id: &str) -> AquaResult<Vec<CachedEvent>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT txId, unitId, eventType, ts, org, status, metadata
                 FROM events WHERE unitId = ?1 ORDER BY ts ASC",
            )
            .map_err(|e| AquaError::CacheQuery(format!("preparing unit events: {e}")))?;

        let rows = stmt
            .query_map(params![unit_id], Self::event_from_row)
            .map_err(|e| AquaError::CacheQuery(format!("listing events for {unit_id}: {e}")))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| AquaError::CacheQuery(format!("reading events for {unit_id}: {e}")))
    }

    /// List every unit sharing a batch id
    pub fn units_by_batch(&self, batch_id: &str) -> AquaResult<Vec<CachedUnit>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT unitId, state, batchId, siteId, warehouseId, verifierId, lastTs, lastEventType
                 FROM units WHERE batchId = ?1 ORDER BY unitId",
            )
            .map_err(|e| AquaError::CacheQuery(format!("preparing batch lookup: {e}")))?;

        let rows = stmt
            .query_map(params![batch_id], Self::unit_from_row)
            .map_err(|e| AquaError::CacheQuery(format!("listing batch {batch_id}: {e}")))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| AquaError::CacheQuery(format!("reading batch {batch_id}: {e}")))
    }

    /// Substring search across unit, batch, site and warehouse ids
    pub fn search_units(&self, query: &str, limit: u32) -> AquaResult<Vec<CachedUnit>> {
        let term = format!("%{query}%");
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT unitId, state, batchId, siteId, warehouseId, verifierId, lastTs, lastEventType
                 FROM units
                 WHERE unitId LIKE ?1 OR batchId LIKE ?1 OR siteId LIKE ?1 OR warehouseId LIKE ?1
                 ORDER BY unitId LIMIT ?2",
            )
            .map_err(|e| AquaError::CacheQuery(format!("preparing search: {e}")))?;

        let rows = stmt
            .query_map(params![term, limit], Self::unit_from_row)
            .map_err(|e| AquaError::CacheQuery(format!("searching units: {e}")))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| AquaError::CacheQuery(format!("reading search results: {e}")))
    }

    /// Compute aggregate statistics over the cached fleet
    pub fn stats(&self) -> AquaResult<CacheStats> {
        let conn = self.lock()?;

        let total_units: i64 = conn
            .query_row("SELECT COUNT(*) FROM units", [], |r| r.get(0))
            .map_err(|e| AquaError::CacheQuery(format!("counting units: {e}")))?;
        let total_events: i64 = conn
            .query_row("SELECT COUNT(*) FROM events", [], |r| r.get(0))
            .map_err(|e| AquaError::CacheQuery(format!("counting events: {e}")))?;

        let state_counts = Self::group_counts(&conn, "SELECT state, COUNT(*) FROM units GROUP BY state")?;
        let event_type_counts =
            Self::group_counts(&conn, "SELECT eventType, COUNT(*) FROM events GROUP BY eventType")?;

        let count_for = |state: &str| state_counts.get(state).copied().unwrap_or(0);
        let verified_count = count_for("VERIFIED");
        let replaced_count = count_for("REPLACED");
        let lost_damaged_count = count_for("LOST_OR_DAMAGED");

        let delivered = verified_count + replaced_count;
        let replacement_compliance = if delivered > 0 {
            let pct = replaced_count as f64 / delivered as f64 * 100.0;
            (pct * 100.0).round() / 100.0
        } else {
            0.0
        };

        Ok(CacheStats {
            total_units,
            total_events,
            state_counts,
            event_type_counts,
            verified_count,
            replaced_count,
            lost_damaged_count,
            verified_deliveries: delivered,
            replacement_compliance,
        })
    }

    fn group_counts(conn: &Connection, sql: &str) -> AquaResult<BTreeMap<String, i64>> {
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| AquaError::CacheQuery(format!("preparing group counts: {e}")))?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .map_err(|e| AquaError::CacheQuery(format!("grouping counts: {e}")))?;

        rows.collect::<rusqlite::Result<BTreeMap<_, _>>>()
            .map_err(|e| AquaError::CacheQuery(format!("reading group counts: {e}")))
    }

    fn unit_from_row(row: &Row<'_>) -> rusqlite::Result<CachedUnit> {
        Ok(CachedUnit {
            unit_id: row.get(0)?,
            state: row.get(1)?,
            batch_id: row.get(2)?,
            site_id: row.get(3)?,
            warehouse_id: row.get(4)?,
            verifier_id: row.get(5)?,
            last_ts: row.get(6)?,
            last_event_type: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        })
    }

    fn event_from_row(row: &Row<'_>) -> rusqlite::Result<CachedEvent> {
        let metadata: Option<String> = row.get(6)?;
        Ok(CachedEvent {
            tx_id: row.get(0)?,
            unit_id: row.get(1)?,
            event_type: row.get(2)?,
            ts: row.get(3)?,
            org: row.get(4)?,
            status: row.get(5)?,
            metadata: metadata.and_then(|m| serde_json::from_str(&m).ok()),
        })
    }
}
