//! # Crop Sub-Placement Types
//!
//! A crop occupies one sub-coordinate of a unit: a row/column cell on a
//! tray, or a channel/position site on a panel. Coordinates are unique
//! within a unit.

use serde::{Deserialize, Serialize};

use crate::identity::{CropId, UnitId};
use crate::temporal::Timestamp;
use crate::unit::UnitKind;

/// A sub-coordinate within a unit.
///
/// The ordering (cells before channels, then lexicographic by fields) is
/// the iteration order of per-unit crop listings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CropCoordinate {
    /// A tray cell.
    Cell {
        /// 1-based row.
        row: u16,
        /// 1-based column.
        column: u16,
    },
    /// A panel site.
    Channel {
        /// 1-based channel number.
        channel: u16,
        /// 1-based position within the channel.
        position: u16,
    },
}

impl CropCoordinate {
    /// Whether this coordinate shape matches the given unit kind
    /// (cells address trays, channels address panels).
    pub fn matches_kind(&self, kind: UnitKind) -> bool {
        matches!(
            (self, kind),
            (Self::Cell { .. }, UnitKind::Tray) | (Self::Channel { .. }, UnitKind::Panel)
        )
    }

    /// The channel number, if this is a channel coordinate.
    pub fn channel(&self) -> Option<u16> {
        match self {
            Self::Channel { channel, .. } => Some(*channel),
            Self::Cell { .. } => None,
        }
    }
}

impl std::fmt::Display for CropCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cell { row, column } => write!(f, "row {row}, column {column}"),
            Self::Channel { channel, position } => {
                write!(f, "channel {channel}, position {position}")
            }
        }
    }
}

/// A crop's assignment to a unit sub-coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropPlacement {
    /// The assigned crop.
    pub crop_id: CropId,
    /// The unit holding the crop.
    pub unit_id: UnitId,
    /// The sub-coordinate within the unit.
    pub coordinate: CropCoordinate,
    /// When the assignment was made.
    pub assigned_at: Timestamp,
}
