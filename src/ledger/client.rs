//! Ledger client abstraction
//!
//! Provides a trait for ledger network access that can be implemented by
//! different backends (in-process embedded ledger, remote network client).
//! The gateway holds an injected `Arc<dyn LedgerClient>` rather than a
//! module-level global, so backends can be swapped and mocked in tests.

use crate::error::AquaResult;
use async_trait::async_trait;

/// Result of a committed ledger transaction
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    /// Transaction identifier assigned by the ledger
    pub tx_id: String,

    /// Contract result payload
    pub result: serde_json::Value,
}

/// Abstract ledger network interface
///
/// `submit` commits a transaction through the lifecycle contract; `evaluate`
/// runs a non-committing read. Both propagate contract-level rejections
/// verbatim.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submit a committing transaction to the lifecycle contract
    async fn submit(&self, operation: &str, args: &[String]) -> AquaResult<SubmitReceipt>;

    /// Evaluate a read-only query against the lifecycle contract
    async fn evaluate(&self, operation: &str, args: &[String]) -> AquaResult<serde_json::Value>;

    /// Release the client's connection and flush pending state
    async fn close(&self) -> AquaResult<()>;

    /// Get the human-readable backend name for display
    fn backend_name(&self) -> &'static str;
}
