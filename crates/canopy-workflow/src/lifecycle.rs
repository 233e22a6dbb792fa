//! # Unit Lifecycle Rules
//!
//! Validated status transitions for growing units. A plain rule table
//! rather than typestate: with four statuses and a terminal absorbing
//! state, the invariant (never leave `Retired`, never return to
//! `Provisioned`) is straightforward to validate at runtime, and unit
//! records must cross serialization boundaries where typestate does not
//! survive anyway.

use canopy_core::{UnitId, UnitStatus, WorkflowError};

/// Validate a status transition for a unit.
///
/// # Errors
///
/// - [`WorkflowError::UnitRetired`] if the unit is already retired —
///   `Retired` is terminal and absorbs every attempted transition.
/// - [`WorkflowError::InvalidTransition`] for any other disallowed move
///   (nothing returns to `Provisioned`).
pub fn check_transition(
    unit_id: UnitId,
    from: UnitStatus,
    to: UnitStatus,
) -> Result<(), WorkflowError> {
    if from.is_terminal() {
        return Err(WorkflowError::UnitRetired(unit_id));
    }

    let allowed = match to {
        // Retiring always succeeds from a non-terminal status.
        UnitStatus::Retired => true,
        // First placement activates the unit; later placements are moves.
        UnitStatus::InUse => matches!(
            from,
            UnitStatus::Provisioned | UnitStatus::InUse | UnitStatus::Storage
        ),
        // Off-grid parking, reachable from any active status.
        UnitStatus::Storage => matches!(
            from,
            UnitStatus::Provisioned | UnitStatus::InUse | UnitStatus::Storage
        ),
        // Provisioned is a birth status, never a destination.
        UnitStatus::Provisioned => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(WorkflowError::InvalidTransition { unit_id, from, to })
    }
}
