//! Error types for Aquatrace
//!
//! All modules use `AquaResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Aquatrace operations
pub type AquaResult<T> = Result<T, AquaError>;

/// All errors that can occur in Aquatrace
#[derive(Error, Debug)]
pub enum AquaError {
    // Input errors
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unit {unit_id} cannot be {operation} from state {state}")]
    InvalidTransition {
        unit_id: String,
        operation: String,
        state: String,
    },

    // Ledger errors
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),

    #[error("Ledger snapshot corrupt at {path}: {reason}")]
    LedgerSnapshotCorrupt { path: PathBuf, reason: String },

    // Cache errors
    #[error("Cache write failed: {0}")]
    CacheWrite(String),

    #[error("Cache query failed: {0}")]
    CacheQuery(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AquaError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an invalid-transition error naming the offending state
    pub fn invalid_transition(
        unit_id: impl Into<String>,
        operation: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self::InvalidTransition {
            unit_id: unit_id.into(),
            operation: operation.into(),
            state: state.into(),
        }
    }

    /// Check if error is retryable
    ///
    /// Only transport-level failures are safe to retry; contract rejections
    /// are terminal for the requested operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LedgerUnavailable(_))
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Conflict(_) => Some("Each unit can only be registered once"),
            Self::NotFound(_) => Some("Register the unit or batch first"),
            Self::LedgerUnavailable(_) => Some("Check the ledger backend and retry"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = AquaError::NotFound("unit b-2024-u-001".to_string());
        assert!(err.to_string().contains("b-2024-u-001"));
    }

    #[test]
    fn invalid_transition_names_state() {
        let err = AquaError::invalid_transition("b-2024-u-001", "shipped", "VERIFIED");
        let msg = err.to_string();
        assert!(msg.contains("VERIFIED"));
        assert!(msg.contains("shipped"));
    }

    #[test]
    fn error_retryable() {
        assert!(AquaError::LedgerUnavailable("connection refused".into()).is_retryable());
        assert!(!AquaError::Conflict("unit exists".into()).is_retryable());
        assert!(!AquaError::CacheWrite("disk full".into()).is_retryable());
    }

    #[test]
    fn error_hint() {
        let err = AquaError::Conflict("unit exists".into());
        assert_eq!(err.hint(), Some("Each unit can only be registered once"));
    }
}
