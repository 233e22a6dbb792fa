//! # Growing Units
//!
//! A unit is the carrier placed into a slot: a nursery **tray** addressed
//! by row/column cells, or a cultivation **panel** addressed by
//! channel/position sites. The unit record owns identity, provisioning
//! metadata, and the current placement reference; slots are derived from
//! `Unit::placement` and never stored independently.

use serde::{Deserialize, Serialize};

use crate::geometry::Placement;
use crate::identity::{ContainerId, RfidTag, UnitId};
use crate::temporal::Timestamp;

/// The two kinds of growing unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitKind {
    /// A nursery tray; crops occupy row/column cells.
    Tray,
    /// A cultivation panel; crops occupy channel/position sites.
    Panel,
}

impl UnitKind {
    /// The canonical string name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tray => "TRAY",
            Self::Panel => "PANEL",
        }
    }

    /// Default crop capacity for a unit of this kind, used when a
    /// provisioning request does not specify one.
    pub fn default_capacity(&self) -> u16 {
        match self {
            Self::Tray => 200,
            Self::Panel => 44,
        }
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit lifecycle status.
///
/// `Retired` is terminal: no transition leaves it, and the record (plus
/// all of its snapshots) persists for historical integrity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitStatus {
    /// Freshly provisioned; never placed.
    Provisioned,
    /// Placed into a slot at least once and still active.
    InUse,
    /// Parked off-grid; keeps its record and crops but holds no slot.
    Storage,
    /// End of lifecycle. Terminal.
    Retired,
}

impl UnitStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provisioned => "PROVISIONED",
            Self::InUse => "IN_USE",
            Self::Storage => "STORAGE",
            Self::Retired => "RETIRED",
        }
    }

    /// Whether this is the terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Retired)
    }
}

impl std::fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A growing unit record.
///
/// Owned by the unit registry; mutated only by the provisioning workflow
/// under the container lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique unit identifier.
    pub id: UnitId,
    /// The container this unit belongs to.
    pub container_id: ContainerId,
    /// Tray or panel.
    pub kind: UnitKind,
    /// The RFID tag bound to this unit; unique within the container.
    pub rfid_tag: RfidTag,
    /// Crop capacity of the unit.
    pub capacity: u16,
    /// Current lifecycle status.
    pub status: UnitStatus,
    /// Current placement; `Unplaced` unless a slot is held.
    pub placement: Placement,
    /// Free-form operator notes from provisioning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the unit was provisioned.
    pub created_at: Timestamp,
    /// When the unit was last mutated.
    pub updated_at: Timestamp,
}

impl Unit {
    /// Create a freshly provisioned, unplaced unit.
    pub fn new(
        container_id: ContainerId,
        kind: UnitKind,
        rfid_tag: RfidTag,
        capacity: Option<u16>,
        notes: Option<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: UnitId::new(),
            container_id,
            kind,
            rfid_tag,
            capacity: capacity.unwrap_or_else(|| kind.default_capacity()),
            status: UnitStatus::Provisioned,
            placement: Placement::Unplaced,
            notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the unit is retired.
    pub fn is_retired(&self) -> bool {
        self.status.is_terminal()
    }

    /// Human-readable location, e.g. `"Nursery: Upper shelf, slot 3"`,
    /// `"Cultivation: Wall 2, slot 17"`, or `"Unplaced"`.
    pub fn location_display(&self) -> String {
        match self.placement.slot_ref() {
            Some(slot) => format!("{}: {}", slot.zone().label(), slot.description()),
            None => "Unplaced".to_string(),
        }
    }
}
