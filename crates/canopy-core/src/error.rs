//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout the allocation core. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every variant carries structured context: ids, bounds, the occupant
//!   that caused a conflict. Nothing is flattened to a bare string until
//!   it crosses the core's boundary.
//! - Component errors ([`GridError`], [`RegistryError`], [`CropError`],
//!   [`WorkflowError`], [`ServiceError`]) aggregate into
//!   [`AllocationError`], which classifies each failure into the
//!   three-way taxonomy ([`ErrorKind`]) that collaborators map onto
//!   transport status codes.
//! - Mutation failures surface synchronously and unchanged. The core never
//!   retries a failed placement — a concurrent actor may have taken the
//!   target slot between attempts, so retry belongs to the caller.

use thiserror::Error;

use crate::crop::CropCoordinate;
use crate::geometry::{SlotRef, Zone};
use crate::identity::{ContainerId, CropId, UnitId};
use crate::unit::UnitStatus;

/// Classification of an allocation failure, for collaborators that map
/// errors onto transport status codes (422 / 409 / 404 in the REST layer
/// that sits outside this core).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is malformed: out-of-range axis, malformed
    /// coordinate, invalid tag.
    Validation,
    /// The request is well-formed but conflicts with current state:
    /// occupied slot, duplicate tag, taken coordinate, retired unit.
    Conflict,
    /// The addressed container, unit, or crop does not exist.
    NotFound,
}

/// Validation failures for domain primitives.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// RFID tag failed format validation.
    #[error("invalid RFID tag: {0:?}")]
    InvalidRfidTag(String),

    /// Timestamp failed format validation.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Errors raised by the slot grid.
#[derive(Error, Debug)]
pub enum GridError {
    /// The slot index exceeds the zone's bound (8 for shelves, 22 for walls).
    #[error("slot {slot} is out of range for {zone} (bound {bound})")]
    OutOfRange {
        /// The zone whose bound was violated.
        zone: Zone,
        /// The 1-based slot index that was requested.
        slot: u16,
        /// The zone's per-axis bound.
        bound: u16,
    },

    /// The target slot already holds a different unit.
    #[error("slot {slot} is already occupied by unit {occupant}")]
    SlotOccupied {
        /// The slot that was requested.
        slot: SlotRef,
        /// The unit currently holding the slot.
        occupant: UnitId,
    },
}

/// Errors raised by the unit registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The RFID tag is already bound to another unit in this container.
    #[error("RFID tag {tag} is already bound to unit {existing}")]
    DuplicateTag {
        /// The conflicting tag (canonical uppercase form).
        tag: String,
        /// The unit that already holds the tag.
        existing: UnitId,
    },

    /// No unit with this id exists.
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),
}

/// Errors raised by the crop index.
#[derive(Error, Debug)]
pub enum CropError {
    /// The coordinate is already occupied within the unit.
    #[error("coordinate {coordinate} on unit {unit_id} is already taken by crop {occupant}")]
    CoordinateTaken {
        /// The unit addressed by the assignment.
        unit_id: UnitId,
        /// The contested coordinate.
        coordinate: CropCoordinate,
        /// The crop currently holding the coordinate.
        occupant: CropId,
    },

    /// The crop is already assigned to a unit. Reassignment is an explicit
    /// unassign followed by assign, not a silent overwrite.
    #[error("crop {crop_id} is already placed on unit {unit_id}")]
    CropAlreadyPlaced {
        /// The crop that was being assigned.
        crop_id: CropId,
        /// The unit the crop is already placed on.
        unit_id: UnitId,
    },

    /// The coordinate shape does not match the unit kind: trays address
    /// row/column cells, panels address channel/position.
    #[error("coordinate {coordinate} does not match the kind of unit {unit_id}")]
    CoordinateKindMismatch {
        /// The unit addressed by the assignment.
        unit_id: UnitId,
        /// The mismatched coordinate.
        coordinate: CropCoordinate,
    },
}

/// Errors raised by the provisioning workflow state machine.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The unit is retired. Retired is terminal — no transition leaves it.
    #[error("unit {0} is retired")]
    UnitRetired(UnitId),

    /// The requested status change is not a valid lifecycle transition.
    #[error("invalid unit transition for {unit_id}: {from} -> {to}")]
    InvalidTransition {
        /// The unit whose transition was rejected.
        unit_id: UnitId,
        /// Current status.
        from: UnitStatus,
        /// Attempted target status.
        to: UnitStatus,
    },
}

/// Errors raised at the service surface.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The addressed container is not known to the container directory.
    #[error("unknown container {0}")]
    UnknownContainer(ContainerId),
}

/// Top-level error type for the allocation core.
///
/// Aggregates every component error and classifies it via [`kind()`].
///
/// [`kind()`]: AllocationError::kind
#[derive(Error, Debug)]
pub enum AllocationError {
    /// A domain primitive failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A slot grid operation failed.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// A unit registry operation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A crop index operation failed.
    #[error(transparent)]
    Crop(#[from] CropError),

    /// A lifecycle transition was rejected.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// A service-surface lookup failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl AllocationError {
    /// Classify this error into the three-way taxonomy.
    ///
    /// No wildcard arms: adding a variant to any component error forces
    /// this classification to be revisited.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(ValidationError::InvalidRfidTag(_))
            | Self::Validation(ValidationError::InvalidTimestamp(_)) => ErrorKind::Validation,

            Self::Grid(GridError::OutOfRange { .. }) => ErrorKind::Validation,
            Self::Grid(GridError::SlotOccupied { .. }) => ErrorKind::Conflict,

            Self::Registry(RegistryError::DuplicateTag { .. }) => ErrorKind::Conflict,
            Self::Registry(RegistryError::UnknownUnit(_)) => ErrorKind::NotFound,

            Self::Crop(CropError::CoordinateTaken { .. })
            | Self::Crop(CropError::CropAlreadyPlaced { .. }) => ErrorKind::Conflict,
            Self::Crop(CropError::CoordinateKindMismatch { .. }) => ErrorKind::Validation,

            Self::Workflow(WorkflowError::UnitRetired(_))
            | Self::Workflow(WorkflowError::InvalidTransition { .. }) => ErrorKind::Conflict,

            Self::Service(ServiceError::UnknownContainer(_)) => ErrorKind::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_is_validation() {
        let err: AllocationError = GridError::OutOfRange {
            zone: Zone::Nursery,
            slot: 9,
            bound: 8,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn slot_occupied_is_conflict() {
        let slot = SlotRef::nursery(crate::geometry::Shelf::Upper, 1).unwrap();
        let err: AllocationError = GridError::SlotOccupied {
            slot,
            occupant: UnitId::new(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn duplicate_tag_is_conflict() {
        let err: AllocationError = RegistryError::DuplicateTag {
            tag: "RFID001".to_string(),
            existing: UnitId::new(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn unknown_unit_is_not_found() {
        let err: AllocationError = RegistryError::UnknownUnit(UnitId::new()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn unknown_container_is_not_found() {
        let err: AllocationError = ServiceError::UnknownContainer(ContainerId::new()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn coordinate_kind_mismatch_is_validation() {
        let err: AllocationError = CropError::CoordinateKindMismatch {
            unit_id: UnitId::new(),
            coordinate: CropCoordinate::Cell { row: 1, column: 1 },
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn retired_unit_is_conflict() {
        let err: AllocationError = WorkflowError::UnitRetired(UnitId::new()).into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn error_display_carries_context() {
        let err = GridError::OutOfRange {
            zone: Zone::Cultivation,
            slot: 23,
            bound: 22,
        };
        let msg = err.to_string();
        assert!(msg.contains("23"));
        assert!(msg.contains("22"));
    }
}
