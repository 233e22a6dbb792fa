//! # Container Directory and Per-Container State
//!
//! The [`AllocationDirectory`] is the concurrency root of the core: a
//! `DashMap` of container id → [`ContainerCell`], where each cell wraps
//! one container's [`AllocationState`] (registry + grid + crop index) in
//! a `parking_lot::Mutex`.
//!
//! All state operations are synchronous (the mutex is `parking_lot`, not
//! an async lock) because the critical section is a handful of map
//! operations — no blocking I/O, network calls, or long computation
//! happens while a cell is locked. `parking_lot` never poisons on panic,
//! so a panicking writer does not permanently wedge a container.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};

use canopy_core::{ContainerId, CropId, UnitId};
use canopy_grid::SlotGrid;

use crate::crops::CropIndex;
use crate::registry::UnitRegistry;

/// One container's complete allocation state.
///
/// The registry owns unit records, the grid owns slot occupancy, the crop
/// index owns sub-placements. They are mutated together under the cell's
/// lock so the cross-structure invariants (a placed unit's `placement`
/// matches the grid; a retired unit has no crops) hold at every unlock.
#[derive(Debug)]
pub struct AllocationState {
    /// Unit records and the unique tag index.
    pub registry: UnitRegistry,
    /// Slot occupancy for both zones.
    pub grid: SlotGrid,
    /// Crop sub-placements.
    pub crops: CropIndex,
}

impl AllocationState {
    /// Create empty state for a container.
    pub fn new(container_id: ContainerId) -> Self {
        Self {
            registry: UnitRegistry::new(container_id),
            grid: SlotGrid::new(),
            crops: CropIndex::new(),
        }
    }
}

/// A container's state behind its mutual-exclusion lock.
#[derive(Debug)]
pub struct ContainerCell {
    container_id: ContainerId,
    state: Mutex<AllocationState>,
}

impl ContainerCell {
    /// Create a cell with empty state.
    pub fn new(container_id: ContainerId) -> Self {
        Self {
            container_id,
            state: Mutex::new(AllocationState::new(container_id)),
        }
    }

    /// The container this cell belongs to.
    pub fn container_id(&self) -> ContainerId {
        self.container_id
    }

    /// Lock the container for a check-then-write sequence.
    ///
    /// Hold the guard only for map operations — snapshot recording and
    /// layout projection happen after release.
    pub fn lock(&self) -> MutexGuard<'_, AllocationState> {
        self.state.lock()
    }
}

/// Existence lookup for containers, consumed from a collaborator.
///
/// Container records (site, hardware, firmware) are owned elsewhere; this
/// core only asks whether a container id is real before operating on it.
pub trait ContainerLookup {
    /// Whether the container exists.
    fn contains_container(&self, container_id: &ContainerId) -> bool;
}

/// A fixed set of known containers.
///
/// The simplest [`ContainerLookup`]: fixtures and tests enumerate their
/// containers up front.
#[derive(Debug, Default, Clone)]
pub struct FixedContainers {
    known: HashSet<ContainerId>,
}

impl FixedContainers {
    /// Create a lookup over the given containers.
    pub fn new(containers: impl IntoIterator<Item = ContainerId>) -> Self {
        Self {
            known: containers.into_iter().collect(),
        }
    }

    /// Add a container to the known set.
    pub fn insert(&mut self, container_id: ContainerId) {
        self.known.insert(container_id);
    }
}

impl ContainerLookup for FixedContainers {
    fn contains_container(&self, container_id: &ContainerId) -> bool {
        self.known.contains(container_id)
    }
}

/// The concurrency root: all containers' cells, plus reverse indexes
/// locating a unit's or crop's home container.
///
/// The reverse indexes are maintained by the workflow after its container
/// lock is released; they are lookup accelerators, not invariant holders —
/// the authoritative state is always inside the cell.
#[derive(Debug, Default)]
pub struct AllocationDirectory {
    containers: DashMap<ContainerId, Arc<ContainerCell>>,
    /// unit → home container. Includes retired units.
    unit_homes: DashMap<UnitId, ContainerId>,
    /// crop → container currently holding its assignment.
    crop_homes: DashMap<CropId, ContainerId>,
}

impl AllocationDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cell for a container, creating empty state on first use.
    pub fn ensure(&self, container_id: ContainerId) -> Arc<ContainerCell> {
        self.containers
            .entry(container_id)
            .or_insert_with(|| Arc::new(ContainerCell::new(container_id)))
            .clone()
    }

    /// The cell for a container, if any state exists for it.
    pub fn get(&self, container_id: ContainerId) -> Option<Arc<ContainerCell>> {
        self.containers.get(&container_id).map(|cell| cell.clone())
    }

    /// Every container with allocation state.
    pub fn container_ids(&self) -> Vec<ContainerId> {
        self.containers.iter().map(|entry| *entry.key()).collect()
    }

    /// Record that a unit lives in a container.
    pub fn note_unit(&self, unit_id: UnitId, container_id: ContainerId) {
        self.unit_homes.insert(unit_id, container_id);
    }

    /// The cell holding a unit, resolved through the reverse index.
    pub fn locate_unit(&self, unit_id: UnitId) -> Option<Arc<ContainerCell>> {
        let container_id = *self.unit_homes.get(&unit_id)?;
        self.get(container_id)
    }

    /// Record that a crop's assignment lives in a container.
    pub fn note_crop(&self, crop_id: CropId, container_id: ContainerId) {
        self.crop_homes.insert(crop_id, container_id);
    }

    /// Drop a crop's reverse-index entry (after unassign or retirement).
    pub fn forget_crop(&self, crop_id: CropId) {
        self.crop_homes.remove(&crop_id);
    }

    /// The cell holding a crop's assignment.
    pub fn locate_crop(&self, crop_id: CropId) -> Option<Arc<ContainerCell>> {
        let container_id = *self.crop_homes.get(&crop_id)?;
        self.get(container_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::{RfidTag, UnitKind};

    #[test]
    fn ensure_reuses_the_same_cell() {
        let directory = AllocationDirectory::new();
        let container = ContainerId::new();
        let a = directory.ensure(container);
        let b = directory.ensure(container);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(directory.container_ids(), vec![container]);
    }

    #[test]
    fn get_without_state_is_none() {
        let directory = AllocationDirectory::new();
        assert!(directory.get(ContainerId::new()).is_none());
    }

    #[test]
    fn unit_location_resolves_through_reverse_index() {
        let directory = AllocationDirectory::new();
        let container = ContainerId::new();
        let cell = directory.ensure(container);

        let unit = cell
            .lock()
            .registry
            .provision(UnitKind::Tray, RfidTag::new("RFID001").unwrap(), None, None)
            .unwrap();
        directory.note_unit(unit.id, container);

        let located = directory.locate_unit(unit.id).unwrap();
        assert_eq!(located.container_id(), container);
        assert!(directory.locate_unit(UnitId::new()).is_none());
    }

    #[test]
    fn crop_location_tracks_and_forgets() {
        let directory = AllocationDirectory::new();
        let container = ContainerId::new();
        directory.ensure(container);

        let crop = CropId::new();
        directory.note_crop(crop, container);
        assert!(directory.locate_crop(crop).is_some());

        directory.forget_crop(crop);
        assert!(directory.locate_crop(crop).is_none());
    }

    #[test]
    fn fixed_containers_lookup() {
        let known = ContainerId::new();
        let lookup = FixedContainers::new([known]);
        assert!(lookup.contains_container(&known));
        assert!(!lookup.contains_container(&ContainerId::new()));
    }

    #[test]
    fn cells_are_independent_across_containers() {
        let directory = AllocationDirectory::new();
        let a = directory.ensure(ContainerId::new());
        let b = directory.ensure(ContainerId::new());

        // Locking one container does not block the other.
        let guard_a = a.lock();
        let guard_b = b.lock();
        assert!(guard_a.registry.is_empty());
        assert!(guard_b.registry.is_empty());
    }
}
