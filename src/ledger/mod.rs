//! Authoritative ledger: contract logic and client seam

pub mod client;
pub mod contract;
pub mod embedded;

pub use client::{LedgerClient, SubmitReceipt};
pub use contract::{LifecycleContract, UnitView};
pub use embedded::EmbeddedLedger;
