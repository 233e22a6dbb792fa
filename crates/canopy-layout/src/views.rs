//! # Layout View Types
//!
//! The shapes handed to collaborators. Views are derived data: they are
//! rebuilt on every query and never stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use canopy_core::{
    ContainerId, CropCoordinate, CropId, Placement, RfidTag, SlotRef, Timestamp, UnitId,
    UnitKind, UnitStatus, Wall,
};

/// Crop enrichment fields consumed from the crop-entity collaborator.
///
/// Used only to decorate layout responses — the allocation core neither
/// stores nor interprets these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropDetail {
    /// Seed type, e.g. `"basil-genovese"`.
    pub seed_type: String,
    /// Lifecycle status as reported by the crop system.
    pub lifecycle_status: String,
    /// Health classification, if the crop system reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_status: Option<String>,
}

/// Crop entity enrichment, consumed from a collaborator.
pub trait CropCatalog {
    /// Enrichment fields for a crop, if the collaborator knows it.
    fn describe(&self, crop_id: &CropId) -> Option<CropDetail>;
}

/// A [`CropCatalog`] that decorates nothing. Layouts render undecorated
/// crop views.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCropCatalog;

impl CropCatalog for NullCropCatalog {
    fn describe(&self, _crop_id: &CropId) -> Option<CropDetail> {
        None
    }
}

/// One crop within a unit view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropView {
    /// The crop occupying the coordinate.
    pub crop_id: CropId,
    /// The sub-coordinate within the unit.
    pub coordinate: CropCoordinate,
    /// When the assignment was made.
    pub assigned_at: Timestamp,
    /// Enrichment from the crop collaborator, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<CropDetail>,
}

/// Crop composition of a unit view: trays expose a flat cell list,
/// panels group by channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropComposition {
    /// Row/column cells of a tray, ordered by coordinate.
    Cells(Vec<CropView>),
    /// Channel number → crops in that channel, ordered by position.
    Channels(BTreeMap<u16, Vec<CropView>>),
}

impl CropComposition {
    /// Total number of crops in the composition.
    pub fn crop_count(&self) -> usize {
        match self {
            Self::Cells(crops) => crops.len(),
            Self::Channels(channels) => channels.values().map(Vec::len).sum(),
        }
    }
}

/// A unit as it appears inside a layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    /// The unit's identifier.
    pub id: UnitId,
    /// The unit's RFID tag.
    pub rfid_tag: RfidTag,
    /// Tray or panel.
    pub kind: UnitKind,
    /// Lifecycle status.
    pub status: UnitStatus,
    /// The unit's placement at projection time.
    pub placement: Placement,
    /// Human-readable location.
    pub location_display: String,
    /// Crop capacity.
    pub capacity: u16,
    /// Number of assigned crops.
    pub crop_count: usize,
    /// Crop fill percentage of the unit.
    pub fill_pct: u8,
    /// The crops on the unit, shaped by kind.
    pub crops: CropComposition,
}

/// One slot of a projected zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotView {
    /// The slot address.
    pub slot: SlotRef,
    /// The unit filling the slot, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupant: Option<UnitView>,
}

/// The nursery zone, projected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NurseryLayout {
    /// The container this layout describes.
    pub container_id: ContainerId,
    /// The 8 upper-shelf slots, in slot order.
    pub upper: Vec<SlotView>,
    /// The 8 lower-shelf slots, in slot order.
    pub lower: Vec<SlotView>,
    /// Units belonging to the container but holding no nursery slot.
    pub off_shelf: Vec<UnitView>,
    /// Number of occupied nursery slots.
    pub occupied_slots: usize,
    /// Total nursery slots (16).
    pub total_slots: usize,
    /// `occupied_slots / total_slots`, percent, round half-up.
    pub utilization_pct: u8,
}

/// One wall of the projected cultivation zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallView {
    /// The wall.
    pub wall: Wall,
    /// The wall's 22 slots, in slot order.
    pub slots: Vec<SlotView>,
}

/// The cultivation zone, projected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CultivationLayout {
    /// The container this layout describes.
    pub container_id: ContainerId,
    /// The four walls, in wall order.
    pub walls: Vec<WallView>,
    /// Units belonging to the container but holding no cultivation slot.
    pub overflow: Vec<UnitView>,
    /// Number of occupied cultivation slots.
    pub occupied_slots: usize,
    /// Total cultivation slots (88).
    pub total_slots: usize,
    /// `occupied_slots / total_slots`, percent, round half-up.
    pub utilization_pct: u8,
}
