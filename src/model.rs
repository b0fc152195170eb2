//! Lifecycle data model
//!
//! Closed enums for states, event kinds and flag reasons, plus the
//! authoritative unit snapshot and its append-only event history. Wire
//! names are camelCase with SCREAMING_SNAKE_CASE enum values, matching
//! what the ledger contract emits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a unit
///
/// A unit is in exactly one state at any time. `Replaced` and
/// `LostOrDamaged` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitState {
    Registered,
    Shipped,
    Received,
    Verified,
    Replaced,
    LostOrDamaged,
}

impl UnitState {
    /// Wire representation of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "REGISTERED",
            Self::Shipped => "SHIPPED",
            Self::Received => "RECEIVED",
            Self::Verified => "VERIFIED",
            Self::Replaced => "REPLACED",
            Self::LostOrDamaged => "LOST_OR_DAMAGED",
        }
    }

    /// Whether any further transition is permitted from this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Replaced | Self::LostOrDamaged)
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UnitState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REGISTERED" => Ok(Self::Registered),
            "SHIPPED" => Ok(Self::Shipped),
            "RECEIVED" => Ok(Self::Received),
            "VERIFIED" => Ok(Self::Verified),
            "REPLACED" => Ok(Self::Replaced),
            "LOST_OR_DAMAGED" => Ok(Self::LostOrDamaged),
            other => Err(format!("unknown unit state: {other}")),
        }
    }
}

/// Kind of lifecycle event appended to a unit's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Registered,
    Shipped,
    Received,
    Verified,
    Replaced,
    Flagged,
}

impl EventKind {
    /// Wire representation of the event kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "REGISTERED",
            Self::Shipped => "SHIPPED",
            Self::Received => "RECEIVED",
            Self::Verified => "VERIFIED",
            Self::Replaced => "REPLACED",
            Self::Flagged => "FLAGGED",
        }
    }

    /// The state a unit lands in after an event of this kind
    ///
    /// Deterministic 1:1 mapping; `Flagged` always maps to
    /// `LostOrDamaged` regardless of the flag reason.
    pub fn resulting_state(&self) -> UnitState {
        match self {
            Self::Registered => UnitState::Registered,
            Self::Shipped => UnitState::Shipped,
            Self::Received => UnitState::Received,
            Self::Verified => UnitState::Verified,
            Self::Replaced => UnitState::Replaced,
            Self::Flagged => UnitState::LostOrDamaged,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reason a unit was flagged out of circulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagReason {
    Lost,
    Damaged,
}

impl FlagReason {
    /// Wire representation of the reason
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lost => "LOST",
            Self::Damaged => "DAMAGED",
        }
    }
}

impl fmt::Display for FlagReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FlagReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOST" => Ok(Self::Lost),
            "DAMAGED" => Ok(Self::Damaged),
            other => Err(format!("reason must be LOST or DAMAGED, got {other}")),
        }
    }
}

/// One immutable fact appended to a unit's history on a transition
///
/// Transition-specific attributes are optional and omitted from the wire
/// form when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Kind of transition this event records
    #[serde(rename = "eventType")]
    pub kind: EventKind,

    /// Seconds since epoch, assigned at contract execution time
    pub timestamp: i64,

    /// Organization of the submitting actor
    pub org: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifier_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FlagReason>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_unit: Option<String>,
}

impl Event {
    /// Create an event with no transition attributes set
    pub fn new(kind: EventKind, timestamp: i64, org: impl Into<String>) -> Self {
        Self {
            kind,
            timestamp,
            org: org.into(),
            batch_id: None,
            destination: None,
            warehouse_id: None,
            site_id: None,
            verifier_id: None,
            reason: None,
            replaced_by: None,
            replaced_unit: None,
        }
    }
}

/// Authoritative record of one tracked unit
///
/// Context attributes are set by specific transitions, persisted once set,
/// never cleared. `history` is append-only; insertion order is
/// chronological order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSnapshot {
    pub unit_id: String,

    pub batch_id: String,

    pub state: UnitState,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifier_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_unit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag_reason: Option<FlagReason>,

    /// Timestamp of registration, immutable
    pub created_at: i64,

    pub history: Vec<Event>,
}

impl UnitSnapshot {
    /// Create a freshly registered unit
    pub fn registered(
        unit_id: impl Into<String>,
        batch_id: impl Into<String>,
        timestamp: i64,
        org: &str,
    ) -> Self {
        let batch_id = batch_id.into();
        let mut event = Event::new(EventKind::Registered, timestamp, org);
        event.batch_id = Some(batch_id.clone());

        Self {
            unit_id: unit_id.into(),
            batch_id,
            state: UnitState::Registered,
            destination: None,
            warehouse_id: None,
            site_id: None,
            verifier_id: None,
            replaced_by: None,
            replaced_unit: None,
            flag_reason: None,
            created_at: timestamp,
            history: vec![event],
        }
    }

    /// Timestamp of the most recent event, falling back to creation time
    pub fn last_updated(&self) -> i64 {
        self.history
            .last()
            .map(|e| e.timestamp)
            .unwrap_or(self.created_at)
    }
}
