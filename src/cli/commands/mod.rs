//! CLI command implementations

pub mod config;
pub mod flag;
pub mod query;
pub mod read;
pub mod receive;
pub mod register;
pub mod replace;
pub mod ship;
pub mod verify;

pub use config::execute as config;
pub use flag::execute as flag;
pub use query::{batch, events, recent, search, stats};
pub use read::execute as read;
pub use receive::execute as receive;
pub use register::execute as register;
pub use replace::execute as replace;
pub use ship::execute as ship;
pub use verify::execute as verify;

use crate::audit::AuditLog;
use crate::cache::CacheStore;
use crate::config::{Config, ConfigManager};
use crate::error::AquaResult;
use crate::gateway::LifecycleGateway;
use crate::ledger::client::LedgerClient;
use crate::ledger::embedded::EmbeddedLedger;
use std::sync::Arc;
use tracing::debug;

/// Build a gateway over the configured ledger backend and cache store
pub(crate) async fn open_gateway(config: &Config) -> AquaResult<LifecycleGateway> {
    let snapshot = config
        .ledger
        .snapshot_path
        .clone()
        .unwrap_or_else(ConfigManager::ledger_snapshot_path);
    let ledger = EmbeddedLedger::open(snapshot, config.ledger.org.as_str()).await?;
    debug!("Using {} ledger backend", ledger.backend_name());

    let db_path = config
        .cache
        .db_path
        .clone()
        .unwrap_or_else(ConfigManager::cache_db_path);
    let store = CacheStore::open(&db_path)?;

    Ok(LifecycleGateway::new(
        Arc::new(ledger),
        store,
        AuditLog::new(config),
        config.ledger.org.as_str(),
    ))
}
