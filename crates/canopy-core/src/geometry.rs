//! # Zone Geometry — Shelves, Walls, and Bounded Slots
//!
//! A container has exactly two zones with fixed capacity:
//!
//! - the **nursery**: two shelves (upper, lower) of [`SHELF_SLOTS`] slots;
//! - the **cultivation** zone: four walls of [`WALL_SLOTS`] slots.
//!
//! A slot address is only representable through [`SlotRef`], whose
//! constructors validate the 1-based slot index against its zone's bound.
//! Deserialization routes through the same constructors, so an
//! out-of-range address cannot enter the system from a fixture or a
//! serialized payload — it fails at the boundary instead of surfacing as
//! a mystery slot downstream.
//!
//! [`Placement`] is the single tagged representation of where a unit
//! lives: `Unplaced`, a nursery shelf slot, or a cultivation wall slot.
//! This replaces the shapeless location dicts of the v1 system, whose
//! readers branched on dict-vs-object and missing keys.

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Number of slots per nursery shelf.
pub const SHELF_SLOTS: u16 = 8;

/// Number of slots per cultivation wall.
pub const WALL_SLOTS: u16 = 22;

// ---------------------------------------------------------------------------
// Zones and axes
// ---------------------------------------------------------------------------

/// The two fixed-capacity partitions of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Zone {
    /// Germination and early growth: two shelves of [`SHELF_SLOTS`] slots.
    Nursery,
    /// Main growth: four walls of [`WALL_SLOTS`] slots.
    Cultivation,
}

impl Zone {
    /// The per-axis slot bound for this zone (8 for shelves, 22 for walls).
    pub fn bound(&self) -> u16 {
        match self {
            Self::Nursery => SHELF_SLOTS,
            Self::Cultivation => WALL_SLOTS,
        }
    }

    /// Number of axis-1 positions in this zone (2 shelves, 4 walls).
    pub fn axis_count(&self) -> usize {
        match self {
            Self::Nursery => Shelf::ALL.len(),
            Self::Cultivation => Wall::ALL.len(),
        }
    }

    /// Total slot capacity of this zone (16 for nursery, 88 for cultivation).
    pub fn total_slots(&self) -> usize {
        self.axis_count() * self.bound() as usize
    }

    /// Every slot of this zone, ordered by axis 1 then slot index.
    pub fn slot_refs(&self) -> Vec<SlotRef> {
        match self {
            Self::Nursery => Shelf::ALL
                .iter()
                .flat_map(|shelf| {
                    (1..=SHELF_SLOTS).map(|slot| SlotRef::Nursery { shelf: *shelf, slot })
                })
                .collect(),
            Self::Cultivation => Wall::ALL
                .iter()
                .flat_map(|wall| {
                    (1..=WALL_SLOTS).map(|slot| SlotRef::Cultivation { wall: *wall, slot })
                })
                .collect(),
        }
    }

    /// The canonical string name of this zone.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nursery => "NURSERY",
            Self::Cultivation => "CULTIVATION",
        }
    }

    /// Human-readable zone name for display strings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Nursery => "Nursery",
            Self::Cultivation => "Cultivation",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two nursery shelves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shelf {
    /// The upper shelf.
    Upper,
    /// The lower shelf.
    Lower,
}

impl Shelf {
    /// Both shelves, in display order.
    pub const ALL: [Shelf; 2] = [Shelf::Upper, Shelf::Lower];

    /// The canonical string name of this shelf.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upper => "UPPER",
            Self::Lower => "LOWER",
        }
    }

    /// Human-readable shelf name for display strings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Upper => "Upper shelf",
            Self::Lower => "Lower shelf",
        }
    }
}

impl std::fmt::Display for Shelf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four cultivation walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Wall {
    /// Wall 1.
    #[serde(rename = "WALL_1")]
    Wall1,
    /// Wall 2.
    #[serde(rename = "WALL_2")]
    Wall2,
    /// Wall 3.
    #[serde(rename = "WALL_3")]
    Wall3,
    /// Wall 4.
    #[serde(rename = "WALL_4")]
    Wall4,
}

impl Wall {
    /// All four walls, in display order.
    pub const ALL: [Wall; 4] = [Wall::Wall1, Wall::Wall2, Wall::Wall3, Wall::Wall4];

    /// The 1-based wall number.
    pub fn number(&self) -> u8 {
        match self {
            Self::Wall1 => 1,
            Self::Wall2 => 2,
            Self::Wall3 => 3,
            Self::Wall4 => 4,
        }
    }

    /// The canonical string name of this wall.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wall1 => "WALL_1",
            Self::Wall2 => "WALL_2",
            Self::Wall3 => "WALL_3",
            Self::Wall4 => "WALL_4",
        }
    }

    /// Human-readable wall name for display strings.
    pub fn label(&self) -> String {
        format!("Wall {}", self.number())
    }
}

impl std::fmt::Display for Wall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Slot addresses
// ---------------------------------------------------------------------------

/// An addressable slot within one of the container's zones.
///
/// The `slot` index is 1-based and always within its zone's bound —
/// construct through [`SlotRef::nursery`] or [`SlotRef::cultivation`],
/// which reject out-of-range indices with [`GridError::OutOfRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "zone", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotRef {
    /// A nursery shelf slot.
    Nursery {
        /// The shelf holding the slot.
        shelf: Shelf,
        /// 1-based slot index, `1..=SHELF_SLOTS`.
        slot: u16,
    },
    /// A cultivation wall slot.
    Cultivation {
        /// The wall holding the slot.
        wall: Wall,
        /// 1-based slot index, `1..=WALL_SLOTS`.
        slot: u16,
    },
}

impl SlotRef {
    /// Address a nursery shelf slot, validating the index bound.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfRange`] if `slot` is zero or exceeds
    /// [`SHELF_SLOTS`].
    pub fn nursery(shelf: Shelf, slot: u16) -> Result<Self, GridError> {
        check_bound(Zone::Nursery, slot)?;
        Ok(Self::Nursery { shelf, slot })
    }

    /// Address a cultivation wall slot, validating the index bound.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfRange`] if `slot` is zero or exceeds
    /// [`WALL_SLOTS`].
    pub fn cultivation(wall: Wall, slot: u16) -> Result<Self, GridError> {
        check_bound(Zone::Cultivation, slot)?;
        Ok(Self::Cultivation { wall, slot })
    }

    /// The zone this slot belongs to.
    pub fn zone(&self) -> Zone {
        match self {
            Self::Nursery { .. } => Zone::Nursery,
            Self::Cultivation { .. } => Zone::Cultivation,
        }
    }

    /// The 1-based slot index along axis 2.
    pub fn slot(&self) -> u16 {
        match self {
            Self::Nursery { slot, .. } | Self::Cultivation { slot, .. } => *slot,
        }
    }

    /// The canonical string name of the axis-1 position (shelf or wall).
    pub fn axis_str(&self) -> &'static str {
        match self {
            Self::Nursery { shelf, .. } => shelf.as_str(),
            Self::Cultivation { wall, .. } => wall.as_str(),
        }
    }

    /// Human-readable slot description, e.g. `"Upper shelf, slot 3"` or
    /// `"Wall 2, slot 17"`.
    pub fn description(&self) -> String {
        match self {
            Self::Nursery { shelf, slot } => format!("{}, slot {slot}", shelf.label()),
            Self::Cultivation { wall, slot } => format!("{}, slot {slot}", wall.label()),
        }
    }
}

impl std::fmt::Display for SlotRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.zone().as_str(), self.axis_str(), self.slot())
    }
}

/// Raw mirror of [`SlotRef`] used to route deserialization through the
/// validating constructors.
#[derive(Deserialize)]
#[serde(tag = "zone", rename_all = "SCREAMING_SNAKE_CASE")]
enum SlotRefRaw {
    Nursery { shelf: Shelf, slot: u16 },
    Cultivation { wall: Wall, slot: u16 },
}

impl<'de> Deserialize<'de> for SlotRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = SlotRefRaw::deserialize(deserializer)?;
        match raw {
            SlotRefRaw::Nursery { shelf, slot } => SlotRef::nursery(shelf, slot),
            SlotRefRaw::Cultivation { wall, slot } => SlotRef::cultivation(wall, slot),
        }
        .map_err(serde::de::Error::custom)
    }
}

/// Validate a 1-based slot index against its zone's bound.
fn check_bound(zone: Zone, slot: u16) -> Result<(), GridError> {
    let bound = zone.bound();
    if slot == 0 || slot > bound {
        return Err(GridError::OutOfRange { zone, slot, bound });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Where a unit currently lives: nowhere, a nursery shelf slot, or a
/// cultivation wall slot.
///
/// `Unplaced` is an ordinary state, not an error — a freshly provisioned
/// unit, a unit parked in storage, and a unit whose preferred slot was
/// taken all sit here until a placement succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "zone", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Placement {
    /// No slot assignment.
    Unplaced,
    /// A nursery shelf slot.
    Nursery {
        /// The shelf holding the unit.
        shelf: Shelf,
        /// 1-based slot index, `1..=SHELF_SLOTS`.
        slot: u16,
    },
    /// A cultivation wall slot.
    Cultivation {
        /// The wall holding the unit.
        wall: Wall,
        /// 1-based slot index, `1..=WALL_SLOTS`.
        slot: u16,
    },
}

impl Placement {
    /// Whether this placement is `Unplaced`.
    pub fn is_unplaced(&self) -> bool {
        matches!(self, Self::Unplaced)
    }

    /// The zone of this placement, if placed.
    pub fn zone(&self) -> Option<Zone> {
        self.slot_ref().map(|slot| slot.zone())
    }

    /// The slot address of this placement, if placed.
    pub fn slot_ref(&self) -> Option<SlotRef> {
        match self {
            Self::Unplaced => None,
            Self::Nursery { shelf, slot } => Some(SlotRef::Nursery {
                shelf: *shelf,
                slot: *slot,
            }),
            Self::Cultivation { wall, slot } => Some(SlotRef::Cultivation {
                wall: *wall,
                slot: *slot,
            }),
        }
    }
}

impl From<SlotRef> for Placement {
    fn from(slot: SlotRef) -> Self {
        match slot {
            SlotRef::Nursery { shelf, slot } => Self::Nursery { shelf, slot },
            SlotRef::Cultivation { wall, slot } => Self::Cultivation { wall, slot },
        }
    }
}

/// Raw mirror of [`Placement`] used to route deserialization through the
/// validating [`SlotRef`] constructors.
#[derive(Deserialize)]
#[serde(tag = "zone", rename_all = "SCREAMING_SNAKE_CASE")]
enum PlacementRaw {
    Unplaced,
    Nursery { shelf: Shelf, slot: u16 },
    Cultivation { wall: Wall, slot: u16 },
}

impl<'de> Deserialize<'de> for Placement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = PlacementRaw::deserialize(deserializer)?;
        match raw {
            PlacementRaw::Unplaced => Ok(Placement::Unplaced),
            PlacementRaw::Nursery { shelf, slot } => {
                SlotRef::nursery(shelf, slot).map(Placement::from)
            }
            PlacementRaw::Cultivation { wall, slot } => {
                SlotRef::cultivation(wall, slot).map(Placement::from)
            }
        }
        .map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Utilization arithmetic
// ---------------------------------------------------------------------------

/// Percentage of `count` over `total`, rounded half-up, in integer
/// arithmetic. `total == 0` yields 0.
///
/// Round-half-up is a documented convention of this core (the v1 system
/// left it unspecified): 3 of 16 slots is 18.75% and reports as 19.
pub fn percent_round_half_up(count: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((count * 200 + total) / (2 * total)) as u8
}
