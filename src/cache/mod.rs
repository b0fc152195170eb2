//! Local cache: SQLite replica of ledger state and its synchronizer

pub mod store;
pub mod sync;

pub use store::{CacheStats, CacheStore, CachedEvent, CachedUnit};
pub use sync::CacheSynchronizer;
