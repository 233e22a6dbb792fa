//! # Slot Grid
//!
//! Occupancy maps for one container: slot → unit, plus a reverse index
//! unit → slot so vacating is O(1). The two maps are kept in lockstep by
//! every mutation.

use std::collections::HashMap;

use canopy_core::{GridError, SlotRef, UnitId, Zone};

/// Slot occupancy for one container, both zones.
#[derive(Debug, Default, Clone)]
pub struct SlotGrid {
    /// slot → occupant.
    occupancy: HashMap<SlotRef, UnitId>,
    /// occupant → slot. Inverse of `occupancy`.
    by_unit: HashMap<UnitId, SlotRef>,
}

impl SlotGrid {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a slot for a unit.
    ///
    /// Re-placing a unit onto its own slot is a no-op success. If the unit
    /// currently holds a different slot, that slot is released as part of
    /// the claim — a unit never holds two placements.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::SlotOccupied`] if a different unit holds the
    /// target slot; the grid is unchanged.
    pub fn place(&mut self, unit_id: UnitId, slot: SlotRef) -> Result<(), GridError> {
        if let Some(occupant) = self.occupancy.get(&slot) {
            if *occupant == unit_id {
                return Ok(());
            }
            return Err(GridError::SlotOccupied {
                slot,
                occupant: *occupant,
            });
        }

        if let Some(previous) = self.by_unit.insert(unit_id, slot) {
            self.occupancy.remove(&previous);
        }
        self.occupancy.insert(slot, unit_id);
        Ok(())
    }

    /// Release whatever slot the unit holds.
    ///
    /// Idempotent: vacating an unplaced unit is a no-op. Returns the slot
    /// that was released, if any.
    pub fn vacate(&mut self, unit_id: UnitId) -> Option<SlotRef> {
        let slot = self.by_unit.remove(&unit_id)?;
        self.occupancy.remove(&slot);
        Some(slot)
    }

    /// Move a unit to a new slot with round-trip safety: vacate, then
    /// place, and if the place fails restore the original slot before
    /// returning the error. A failed move never leaves the unit without
    /// its prior placement.
    pub fn relocate(&mut self, unit_id: UnitId, slot: SlotRef) -> Result<(), GridError> {
        let prior = self.vacate(unit_id);
        match self.place(unit_id, slot) {
            Ok(()) => Ok(()),
            Err(err) => {
                if let Some(previous) = prior {
                    // The slot was released above and the container lock is
                    // held for the whole relocate, so the restore cannot fail.
                    let restored = self.place(unit_id, previous);
                    debug_assert!(restored.is_ok());
                }
                Err(err)
            }
        }
    }

    /// The unit occupying a slot, if any.
    pub fn occupant_at(&self, slot: SlotRef) -> Option<UnitId> {
        self.occupancy.get(&slot).copied()
    }

    /// The slot a unit occupies, if any.
    pub fn slot_of(&self, unit_id: UnitId) -> Option<SlotRef> {
        self.by_unit.get(&unit_id).copied()
    }

    /// All unoccupied slots of a zone, ordered by axis 1 then slot index.
    pub fn available_slots(&self, zone: Zone) -> Vec<SlotRef> {
        zone.slot_refs()
            .into_iter()
            .filter(|slot| !self.occupancy.contains_key(slot))
            .collect()
    }

    /// Number of occupied slots in a zone.
    pub fn occupied_count(&self, zone: Zone) -> usize {
        self.occupancy
            .keys()
            .filter(|slot| slot.zone() == zone)
            .count()
    }
}
