//! # Crop Index
//!
//! Crop → unit sub-coordinate assignments for one container. Coordinate
//! uniqueness is per unit; a crop holds at most one assignment.
//!
//! Reassigning a crop's coordinate is an explicit unassign followed by
//! assign, not a single atomic update — only one actor at a time
//! manipulates a given crop's placement, because both halves run under
//! the container lock.

use std::collections::{BTreeMap, HashMap};

use canopy_core::{CropCoordinate, CropError, CropId, CropPlacement, Timestamp, UnitId};

/// Crop assignments for one container.
#[derive(Debug, Default, Clone)]
pub struct CropIndex {
    /// crop → its assignment.
    by_crop: HashMap<CropId, CropPlacement>,
    /// unit → coordinate → crop. Ordered so listings iterate by coordinate.
    by_unit: HashMap<UnitId, BTreeMap<CropCoordinate, CropId>>,
}

impl CropIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a crop to a unit sub-coordinate.
    ///
    /// # Errors
    ///
    /// - [`CropError::CropAlreadyPlaced`] if the crop already holds an
    ///   assignment (unassign first).
    /// - [`CropError::CoordinateTaken`] if another crop occupies the
    ///   coordinate on this unit.
    pub fn assign(
        &mut self,
        crop_id: CropId,
        unit_id: UnitId,
        coordinate: CropCoordinate,
    ) -> Result<CropPlacement, CropError> {
        if let Some(existing) = self.by_crop.get(&crop_id) {
            return Err(CropError::CropAlreadyPlaced {
                crop_id,
                unit_id: existing.unit_id,
            });
        }

        let coordinates = self.by_unit.entry(unit_id).or_default();
        if let Some(occupant) = coordinates.get(&coordinate) {
            return Err(CropError::CoordinateTaken {
                unit_id,
                coordinate,
                occupant: *occupant,
            });
        }

        let placement = CropPlacement {
            crop_id,
            unit_id,
            coordinate,
            assigned_at: Timestamp::now(),
        };
        coordinates.insert(coordinate, crop_id);
        self.by_crop.insert(crop_id, placement.clone());
        Ok(placement)
    }

    /// Remove a crop's assignment.
    ///
    /// Idempotent: unassigning an unplaced crop is a no-op. Returns the
    /// removed assignment, if any.
    pub fn unassign(&mut self, crop_id: CropId) -> Option<CropPlacement> {
        let placement = self.by_crop.remove(&crop_id)?;
        if let Some(coordinates) = self.by_unit.get_mut(&placement.unit_id) {
            coordinates.remove(&placement.coordinate);
            if coordinates.is_empty() {
                self.by_unit.remove(&placement.unit_id);
            }
        }
        Some(placement)
    }

    /// A crop's current assignment, if any.
    pub fn placement_of(&self, crop_id: CropId) -> Option<CropPlacement> {
        self.by_crop.get(&crop_id).cloned()
    }

    /// All crops on a unit, ordered by coordinate.
    pub fn crops_of(&self, unit_id: UnitId) -> Vec<CropPlacement> {
        self.by_unit
            .get(&unit_id)
            .map(|coordinates| {
                coordinates
                    .values()
                    .filter_map(|crop_id| self.by_crop.get(crop_id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Panel grouping helper: channel number → crops in that channel,
    /// ordered by position. Cell-addressed (tray) assignments are skipped —
    /// trays have no channels.
    pub fn by_channel(&self, unit_id: UnitId) -> BTreeMap<u16, Vec<CropPlacement>> {
        let mut grouped: BTreeMap<u16, Vec<CropPlacement>> = BTreeMap::new();
        for placement in self.crops_of(unit_id) {
            if let Some(channel) = placement.coordinate.channel() {
                grouped.entry(channel).or_default().push(placement);
            }
        }
        grouped
    }

    /// Remove every assignment on a unit, returning them in coordinate
    /// order. Used by retirement.
    pub fn clear_unit(&mut self, unit_id: UnitId) -> Vec<CropPlacement> {
        let Some(coordinates) = self.by_unit.remove(&unit_id) else {
            return Vec::new();
        };
        coordinates
            .values()
            .filter_map(|crop_id| self.by_crop.remove(crop_id))
            .collect()
    }

    /// Number of crops assigned to a unit.
    pub fn crop_count(&self, unit_id: UnitId) -> usize {
        self.by_unit
            .get(&unit_id)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }
}
