//! Lifecycle ledger contract
//!
//! Pure state-transition logic executed against the authoritative record on
//! every submitted transaction. Multi-unit operations validate every target
//! before mutating any, so a rejected transaction leaves no partial state.
//! Timestamps are assigned by the executing ledger, never by callers.

use crate::error::{AquaError, AquaResult};
use crate::model::{Event, EventKind, FlagReason, UnitSnapshot, UnitState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Authoritative state owned by the lifecycle contract
///
/// One entry per unit, keyed by unit id. Units are never removed; terminal
/// units persist for audit.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LifecycleContract {
    units: BTreeMap<String, UnitSnapshot>,
}

/// Receipt for a successful `RegisterBatch`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReceipt {
    pub success: bool,
    pub batch_id: String,
    pub unit_count: usize,
    pub timestamp: i64,
}

/// Receipt for a successful `ShipBatch`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipReceipt {
    pub success: bool,
    pub batch_id: String,
    pub destination: String,
    pub unit_count: usize,
    pub timestamp: i64,
}

/// Receipt for a successful `ReceiveAtWarehouse`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveReceipt {
    pub success: bool,
    pub unit_id: String,
    pub warehouse_id: String,
    pub timestamp: i64,
}

/// Receipt for a successful `VerifyAtSite`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyReceipt {
    pub success: bool,
    pub unit_id: String,
    pub site_id: String,
    pub verifier_id: String,
    pub timestamp: i64,
}

/// Receipt for a successful `ReplaceUnit`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceReceipt {
    pub success: bool,
    pub old_unit_id: String,
    pub new_unit_id: String,
    pub site_id: String,
    pub timestamp: i64,
}

/// Receipt for a successful `FlagLostDamaged`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagReceipt {
    pub success: bool,
    pub unit_id: String,
    pub reason: FlagReason,
    pub timestamp: i64,
}

/// Full snapshot returned by `ReadUnit`: current state plus complete history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitView {
    pub unit_id: String,
    pub batch_id: String,
    pub state: UnitState,
    pub destination: Option<String>,
    pub site_id: Option<String>,
    pub warehouse_id: Option<String>,
    pub verifier_id: Option<String>,
    pub replaced_by: Option<String>,
    pub replaced_unit: Option<String>,
    pub flag_reason: Option<FlagReason>,
    pub history: Vec<Event>,
    pub created_at: i64,
    pub last_updated: i64,
}

impl UnitView {
    fn from_snapshot(unit: &UnitSnapshot) -> Self {
        Self {
            unit_id: unit.unit_id.clone(),
            batch_id: unit.batch_id.clone(),
            state: unit.state,
            destination: unit.destination.clone(),
            site_id: unit.site_id.clone(),
            warehouse_id: unit.warehouse_id.clone(),
            verifier_id: unit.verifier_id.clone(),
            replaced_by: unit.replaced_by.clone(),
            replaced_unit: unit.replaced_unit.clone(),
            flag_reason: unit.flag_reason,
            history: unit.history.clone(),
            created_at: unit.created_at,
            last_updated: unit.last_updated(),
        }
    }
}

impl LifecycleContract {
    /// Create an empty contract state
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of units on the ledger
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Register a batch of new units
    ///
    /// Fails with a conflict if any unit id already exists; no unit is
    /// created in that case. Duplicate registration is an error, never a
    /// no-op.
    pub fn register_batch(
        &mut self,
        batch_id: &str,
        unit_ids: &[String],
        timestamp: i64,
        org: &str,
    ) -> AquaResult<RegisterReceipt> {
        if batch_id.is_empty() {
            return Err(AquaError::validation("batch id is required"));
        }
        if unit_ids.is_empty() {
            return Err(AquaError::validation("unit ids must be a non-empty list"));
        }

        for unit_id in unit_ids {
            if unit_id.is_empty() {
                return Err(AquaError::validation("unit id must not be empty"));
            }
            if self.units.contains_key(unit_id)
                || unit_ids.iter().filter(|u| *u == unit_id).count() > 1
            {
                return Err(AquaError::Conflict(format!("unit {unit_id} already exists")));
            }
        }

        for unit_id in unit_ids {
            let unit = UnitSnapshot::registered(unit_id, batch_id, timestamp, org);
            self.units.insert(unit_id.clone(), unit);
        }

        Ok(RegisterReceipt {
            success: true,
            batch_id: batch_id.to_string(),
            unit_count: unit_ids.len(),
            timestamp,
        })
    }

    /// Ship a batch of registered units to a destination
    ///
    /// One atomic multi-unit call: every unit must exist and be
    /// `REGISTERED`, otherwise nothing is shipped.
    pub fn ship_batch(
        &mut self,
        batch_id: &str,
        destination: &str,
        unit_ids: &[String],
        timestamp: i64,
        org: &str,
    ) -> AquaResult<ShipReceipt> {
        if batch_id.is_empty() || destination.is_empty() {
            return Err(AquaError::validation(
                "batch id and destination are required",
            ));
        }
        if unit_ids.is_empty() {
            return Err(AquaError::validation("unit ids must be a non-empty list"));
        }

        for unit_id in unit_ids {
            let unit = self.get(unit_id)?;
            if unit.state != UnitState::Registered {
                return Err(AquaError::invalid_transition(
                    unit_id,
                    "shipped",
                    unit.state.as_str(),
                ));
            }
        }

        for unit_id in unit_ids {
            let unit = self.units.get_mut(unit_id).expect("validated above");
            unit.state = UnitState::Shipped;
            unit.destination = Some(destination.to_string());

            let mut event = Event::new(EventKind::Shipped, timestamp, org);
            event.destination = Some(destination.to_string());
            unit.history.push(event);
        }

        Ok(ShipReceipt {
            success: true,
            batch_id: batch_id.to_string(),
            destination: destination.to_string(),
            unit_count: unit_ids.len(),
            timestamp,
        })
    }

    /// Record receipt of a shipped unit at a warehouse
    pub fn receive_at_warehouse(
        &mut self,
        unit_id: &str,
        warehouse_id: &str,
        timestamp: i64,
        org: &str,
    ) -> AquaResult<ReceiveReceipt> {
        if unit_id.is_empty() || warehouse_id.is_empty() {
            return Err(AquaError::validation(
                "unit id and warehouse id are required",
            ));
        }

        let unit = self.get(unit_id)?;
        if unit.state != UnitState::Shipped {
            return Err(AquaError::invalid_transition(
                unit_id,
                "received",
                unit.state.as_str(),
            ));
        }

        let unit = self.units.get_mut(unit_id).expect("validated above");
        unit.state = UnitState::Received;
        unit.warehouse_id = Some(warehouse_id.to_string());

        let mut event = Event::new(EventKind::Received, timestamp, org);
        event.warehouse_id = Some(warehouse_id.to_string());
        unit.history.push(event);

        Ok(ReceiveReceipt {
            success: true,
            unit_id: unit_id.to_string(),
            warehouse_id: warehouse_id.to_string(),
            timestamp,
        })
    }

    /// Record verification of a received unit's delivery at a site
    pub fn verify_at_site(
        &mut self,
        unit_id: &str,
        site_id: &str,
        verifier_id: &str,
        timestamp: i64,
        org: &str,
    ) -> AquaResult<VerifyReceipt> {
        if unit_id.is_empty() || site_id.is_empty() || verifier_id.is_empty() {
            return Err(AquaError::validation(
                "unit id, site id and verifier id are required",
            ));
        }

        let unit = self.get(unit_id)?;
        if unit.state != UnitState::Received {
            return Err(AquaError::invalid_transition(
                unit_id,
                "verified",
                unit.state.as_str(),
            ));
        }

        let unit = self.units.get_mut(unit_id).expect("validated above");
        unit.state = UnitState::Verified;
        unit.site_id = Some(site_id.to_string());
        unit.verifier_id = Some(verifier_id.to_string());

        let mut event = Event::new(EventKind::Verified, timestamp, org);
        event.site_id = Some(site_id.to_string());
        event.verifier_id = Some(verifier_id.to_string());
        unit.history.push(event);

        Ok(VerifyReceipt {
            success: true,
            unit_id: unit_id.to_string(),
            site_id: site_id.to_string(),
            verifier_id: verifier_id.to_string(),
            timestamp,
        })
    }

    /// Replace a verified unit with a pre-registered replacement
    ///
    /// Atomic dual-unit transition: the old unit moves to `REPLACED` and
    /// the new unit to `VERIFIED`, or neither changes. The new unit must
    /// already exist; replacement never creates units.
    pub fn replace_unit(
        &mut self,
        old_unit_id: &str,
        new_unit_id: &str,
        site_id: &str,
        timestamp: i64,
        org: &str,
    ) -> AquaResult<ReplaceReceipt> {
        if old_unit_id.is_empty() || new_unit_id.is_empty() || site_id.is_empty() {
            return Err(AquaError::validation(
                "old unit id, new unit id and site id are required",
            ));
        }

        let old_unit = self.get(old_unit_id)?;
        if old_unit.state != UnitState::Verified {
            return Err(AquaError::invalid_transition(
                old_unit_id,
                "replaced",
                old_unit.state.as_str(),
            ));
        }

        let new_unit = self.units.get(new_unit_id).ok_or_else(|| {
            AquaError::NotFound(format!(
                "unit {new_unit_id} not found, register it before replacement"
            ))
        })?;
        if !matches!(
            new_unit.state,
            UnitState::Received | UnitState::Registered
        ) {
            return Err(AquaError::invalid_transition(
                new_unit_id,
                "verified",
                new_unit.state.as_str(),
            ));
        }

        let old_unit = self.units.get_mut(old_unit_id).expect("validated above");
        old_unit.state = UnitState::Replaced;
        old_unit.replaced_by = Some(new_unit_id.to_string());

        let mut event = Event::new(EventKind::Replaced, timestamp, org);
        event.replaced_by = Some(new_unit_id.to_string());
        event.site_id = Some(site_id.to_string());
        old_unit.history.push(event);

        let new_unit = self.units.get_mut(new_unit_id).expect("validated above");
        new_unit.state = UnitState::Verified;
        new_unit.site_id = Some(site_id.to_string());
        new_unit.replaced_unit = Some(old_unit_id.to_string());

        let mut event = Event::new(EventKind::Verified, timestamp, org);
        event.site_id = Some(site_id.to_string());
        event.replaced_unit = Some(old_unit_id.to_string());
        new_unit.history.push(event);

        Ok(ReplaceReceipt {
            success: true,
            old_unit_id: old_unit_id.to_string(),
            new_unit_id: new_unit_id.to_string(),
            site_id: site_id.to_string(),
            timestamp,
        })
    }

    /// Flag a unit as lost or damaged
    ///
    /// Permitted from any non-terminal state.
    pub fn flag_lost_damaged(
        &mut self,
        unit_id: &str,
        reason: FlagReason,
        timestamp: i64,
        org: &str,
    ) -> AquaResult<FlagReceipt> {
        if unit_id.is_empty() {
            return Err(AquaError::validation("unit id is required"));
        }

        let unit = self.get(unit_id)?;
        if unit.state.is_terminal() {
            return Err(AquaError::invalid_transition(
                unit_id,
                "flagged",
                unit.state.as_str(),
            ));
        }

        let unit = self.units.get_mut(unit_id).expect("validated above");
        unit.state = UnitState::LostOrDamaged;
        unit.flag_reason = Some(reason);

        let mut event = Event::new(EventKind::Flagged, timestamp, org);
        event.reason = Some(reason);
        unit.history.push(event);

        Ok(FlagReceipt {
            success: true,
            unit_id: unit_id.to_string(),
            reason,
            timestamp,
        })
    }

    /// Read a unit's full snapshot and history
    ///
    /// Pure query; never mutates ledger state.
    pub fn read_unit(&self, unit_id: &str) -> AquaResult<UnitView> {
        if unit_id.is_empty() {
            return Err(AquaError::validation("unit id is required"));
        }
        Ok(UnitView::from_snapshot(self.get(unit_id)?))
    }

    fn get(&self, unit_id: &str) -> AquaResult<&UnitSnapshot> {
        self.units
            .get(unit_id)
            .ok_or_else(|| AquaError::NotFound(format!("unit {unit_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORG: &str = "Org1MSP";

    fn units(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn registered_contract() -> LifecycleContract {
        let mut contract = LifecycleContract::new();
        contract
            .register_batch("batch-2024-001", &units(&["u1", "u2"]), 100, ORG)
            .unwrap();
        contract
    }

    /// Drive u1 to the given state through the normal edges
    fn advance(contract: &mut LifecycleContract, unit: &str, target: UnitState) {
        if target == UnitState::Registered {
            return;
        }
        contract
            .ship_batch("batch-2024-001", "Nairobi", &units(&[unit]), 110, ORG)
            .unwrap();
        if target == UnitState::Shipped {
            return;
        }
        contract
            .receive_at_warehouse(unit, "WH-001", 120, ORG)
            .unwrap();
        if target == UnitState::Received {
            return;
        }
        contract
            .verify_at_site(unit, "SITE-1", "agent-1", 130, ORG)
            .unwrap();
    }

    #[test]
    fn register_creates_units() {
        let contract = registered_contract();

        assert_eq!(contract.unit_count(), 2);
        let view = contract.read_unit("u1").unwrap();
        assert_eq!(view.state, UnitState::Registered);
        assert_eq!(view.batch_id, "batch-2024-001");
        assert_eq!(view.history.len(), 1);
        assert_eq!(view.created_at, 100);
    }

    #[test]
    fn register_duplicate_conflicts() {
        let mut contract = registered_contract();

        let err = contract
            .register_batch("batch-2024-002", &units(&["u1"]), 200, ORG)
            .unwrap_err();
        assert!(matches!(err, AquaError::Conflict(_)));

        // regardless of the existing unit's state
        advance(&mut contract, "u1", UnitState::Verified);
        let err = contract
            .register_batch("batch-2024-003", &units(&["u1"]), 300, ORG)
            .unwrap_err();
        assert!(matches!(err, AquaError::Conflict(_)));
    }

    #[test]
    fn register_duplicate_leaves_no_partial_state() {
        let mut contract = registered_contract();

        let err = contract
            .register_batch("batch-2024-002", &units(&["u9", "u1"]), 200, ORG)
            .unwrap_err();
        assert!(matches!(err, AquaError::Conflict(_)));
        assert!(contract.read_unit("u9").is_err());
    }

    #[test]
    fn register_rejects_duplicate_ids_within_batch() {
        let mut contract = LifecycleContract::new();
        let err = contract
            .register_batch("batch-2024-001", &units(&["u1", "u1"]), 100, ORG)
            .unwrap_err();
        assert!(matches!(err, AquaError::Conflict(_)));
        assert_eq!(contract.unit_count(), 0);
    }

    #[test]
    fn register_validates_inputs() {
        let mut contract = LifecycleContract::new();
        assert!(matches!(
            contract.register_batch("", &units(&["u1"]), 100, ORG),
            Err(AquaError::Validation(_))
        ));
        assert!(matches!(
            contract.register_batch("batch-2024-001", &[], 100, ORG),
            Err(AquaError::Validation(_))
        ));
    }

    #[test]
    fn ship_sets_destination_and_appends() {
        let mut contract = registered_contract();
        contract
            .ship_batch("batch-2024-001", "Nairobi", &units(&["u1", "u2"]), 110, ORG)
            .unwrap();

        for id in ["u1", "u2"] {
            let view = contract.read_unit(id).unwrap();
            assert_eq!(view.state, UnitState::Shipped);
            assert_eq!(view.destination.as_deref(), Some("Nairobi"));
            assert_eq!(view.history.len(), 2);
            assert_eq!(view.history[1].destination.as_deref(), Some("Nairobi"));
        }
    }

    #[test]
    fn ship_is_atomic_across_units() {
        let mut contract = registered_contract();
        advance(&mut contract, "u1", UnitState::Shipped);

        // u1 already shipped, so the whole call must fail and u2 stay put
        let err = contract
            .ship_batch("batch-2024-001", "Mombasa", &units(&["u2", "u1"]), 150, ORG)
            .unwrap_err();
        assert!(matches!(err, AquaError::InvalidTransition { .. }));
        assert_eq!(
            contract.read_unit("u2").unwrap().state,
            UnitState::Registered
        );
    }

    #[test]
    fn wrong_state_error_names_current_state() {
        let mut contract = registered_contract();

        let err = contract
            .receive_at_warehouse("u1", "WH-001", 110, ORG)
            .unwrap_err();
        assert!(err.to_string().contains("REGISTERED"));

        let err = contract
            .verify_at_site("u1", "SITE-1", "agent-1", 110, ORG)
            .unwrap_err();
        assert!(err.to_string().contains("REGISTERED"));
    }

    #[test]
    fn receive_and_verify_record_context() {
        let mut contract = registered_contract();
        advance(&mut contract, "u1", UnitState::Verified);

        let view = contract.read_unit("u1").unwrap();
        assert_eq!(view.state, UnitState::Verified);
        assert_eq!(view.warehouse_id.as_deref(), Some("WH-001"));
        assert_eq!(view.site_id.as_deref(), Some("SITE-1"));
        assert_eq!(view.verifier_id.as_deref(), Some("agent-1"));
        assert_eq!(view.history.len(), 4);
        assert_eq!(view.last_updated, 130);
    }

    #[test]
    fn operations_on_missing_unit_not_found() {
        let mut contract = LifecycleContract::new();
        assert!(matches!(
            contract.receive_at_warehouse("ghost", "WH-001", 100, ORG),
            Err(AquaError::NotFound(_))
        ));
        assert!(matches!(
            contract.flag_lost_damaged("ghost", FlagReason::Lost, 100, ORG),
            Err(AquaError::NotFound(_))
        ));
        assert!(matches!(
            contract.read_unit("ghost"),
            Err(AquaError::NotFound(_))
        ));
    }

    #[test]
    fn replace_moves_both_units() {
        let mut contract = registered_contract();
        advance(&mut contract, "u1", UnitState::Verified);
        contract
            .register_batch("batch-2024-002", &units(&["u3"]), 140, ORG)
            .unwrap();

        contract
            .replace_unit("u1", "u3", "SITE-1", 150, ORG)
            .unwrap();

        let old = contract.read_unit("u1").unwrap();
        assert_eq!(old.state, UnitState::Replaced);
        assert_eq!(old.replaced_by.as_deref(), Some("u3"));
        assert_eq!(old.history.last().unwrap().kind, EventKind::Replaced);

        let new = contract.read_unit("u3").unwrap();
        assert_eq!(new.state, UnitState::Verified);
        assert_eq!(new.replaced_unit.as_deref(), Some("u1"));
        assert_eq!(new.site_id.as_deref(), Some("SITE-1"));
        assert_eq!(new.history.last().unwrap().kind, EventKind::Verified);
    }

    #[test]
    fn replace_requires_verified_old_unit() {
        let mut contract = registered_contract();
        contract
            .register_batch("batch-2024-002", &units(&["u3"]), 140, ORG)
            .unwrap();

        let err = contract
            .replace_unit("u1", "u3", "SITE-1", 150, ORG)
            .unwrap_err();
        assert!(err.to_string().contains("REGISTERED"));

        // neither unit changed
        assert_eq!(
            contract.read_unit("u1").unwrap().state,
            UnitState::Registered
        );
        assert_eq!(
            contract.read_unit("u3").unwrap().state,
            UnitState::Registered
        );
    }

    #[test]
    fn replace_rejects_bad_new_unit_state_atomically() {
        let mut contract = registered_contract();
        advance(&mut contract, "u1", UnitState::Verified);
        contract
            .register_batch("batch-2024-002", &units(&["u3"]), 140, ORG)
            .unwrap();
        contract
            .flag_lost_damaged("u3", FlagReason::Damaged, 145, ORG)
            .unwrap();

        let err = contract
            .replace_unit("u1", "u3", "SITE-1", 150, ORG)
            .unwrap_err();
        assert!(err.to_string().contains("LOST_OR_DAMAGED"));

        let old = contract.read_unit("u1").unwrap();
        assert_eq!(old.state, UnitState::Verified);
        assert!(old.replaced_by.is_none());
        assert_eq!(old.history.len(), 4);
    }

    #[test]
    fn replace_never_creates_the_new_unit() {
        let mut contract = registered_contract();
        advance(&mut contract, "u1", UnitState::Verified);

        let err = contract
            .replace_unit("u1", "u3", "SITE-1", 150, ORG)
            .unwrap_err();
        assert!(matches!(err, AquaError::NotFound(_)));
        assert!(contract.read_unit("u3").is_err());
        assert_eq!(contract.read_unit("u1").unwrap().state, UnitState::Verified);
    }

    #[test]
    fn flag_from_any_active_state() {
        for target in [
            UnitState::Registered,
            UnitState::Shipped,
            UnitState::Received,
            UnitState::Verified,
        ] {
            let mut contract = registered_contract();
            advance(&mut contract, "u1", target);
            contract
                .flag_lost_damaged("u1", FlagReason::Lost, 200, ORG)
                .unwrap();

            let view = contract.read_unit("u1").unwrap();
            assert_eq!(view.state, UnitState::LostOrDamaged);
            assert_eq!(view.flag_reason, Some(FlagReason::Lost));
            assert_eq!(view.history.last().unwrap().reason, Some(FlagReason::Lost));
        }
    }

    #[test]
    fn flag_terminal_states_rejected() {
        let mut contract = registered_contract();
        contract
            .flag_lost_damaged("u2", FlagReason::Lost, 200, ORG)
            .unwrap();

        let err = contract
            .flag_lost_damaged("u2", FlagReason::Damaged, 210, ORG)
            .unwrap_err();
        assert!(err.to_string().contains("LOST_OR_DAMAGED"));

        advance(&mut contract, "u1", UnitState::Verified);
        contract
            .register_batch("batch-2024-002", &units(&["u3"]), 220, ORG)
            .unwrap();
        contract
            .replace_unit("u1", "u3", "SITE-1", 230, ORG)
            .unwrap();
        let err = contract
            .flag_lost_damaged("u1", FlagReason::Lost, 240, ORG)
            .unwrap_err();
        assert!(err.to_string().contains("REPLACED"));
    }

    #[test]
    fn history_grows_with_each_transition() {
        let mut contract = registered_contract();
        assert_eq!(contract.read_unit("u1").unwrap().history.len(), 1);

        advance(&mut contract, "u1", UnitState::Verified);
        assert_eq!(contract.read_unit("u1").unwrap().history.len(), 4);

        // a rejected transition appends nothing
        let _ = contract.receive_at_warehouse("u1", "WH-002", 300, ORG);
        assert_eq!(contract.read_unit("u1").unwrap().history.len(), 4);
    }

    #[test]
    fn batch_id_survives_every_transition() {
        let mut contract = registered_contract();
        advance(&mut contract, "u1", UnitState::Verified);
        contract
            .register_batch("batch-2024-002", &units(&["u3"]), 140, ORG)
            .unwrap();
        contract
            .replace_unit("u1", "u3", "SITE-1", 150, ORG)
            .unwrap();

        assert_eq!(contract.read_unit("u1").unwrap().batch_id, "batch-2024-001");
        assert_eq!(contract.read_unit("u3").unwrap().batch_id, "batch-2024-002");
    }

    #[test]
    fn read_has_no_side_effects() {
        let contract = registered_contract();
        let before = contract.read_unit("u1").unwrap();
        let after = contract.read_unit("u1").unwrap();
        assert_eq!(before.history.len(), after.history.len());
        assert_eq!(before.last_updated, after.last_updated);
    }

    #[test]
    fn contract_state_roundtrips_through_json() {
        let mut contract = registered_contract();
        advance(&mut contract, "u1", UnitState::Received);

        let json = serde_json::to_string(&contract).unwrap();
        let restored: LifecycleContract = serde_json::from_str(&json).unwrap();

        let view = restored.read_unit("u1").unwrap();
        assert_eq!(view.state, UnitState::Received);
        assert_eq!(view.history.len(), 3);
    }
}
