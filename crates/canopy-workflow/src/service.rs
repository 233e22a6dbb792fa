//! # Allocation Service
//!
//! The facade collaborators call. Every mutating operation resolves the
//! target container's cell, runs its check-then-write sequence under that
//! cell's lock, releases the lock, and then appends a snapshot of the
//! unit's new state.
//!
//! Mutation failures surface synchronously and unchanged. The service
//! never retries a failed placement: a concurrent actor may have taken
//! the target slot between attempts, so retry is the caller's
//! responsibility — typically after re-querying [`available_slots`].
//!
//! [`available_slots`]: AllocationService::available_slots

use std::sync::Arc;

use canopy_core::{
    AllocationError, ContainerId, CropCoordinate, CropError, CropId, CropPlacement, GridError,
    Placement, RegistryError, RfidTag, ServiceError, SlotRef, Timestamp, Unit, UnitId, UnitKind,
    UnitStatus, WorkflowError, Zone,
};
use canopy_layout::{
    project_cultivation, project_nursery, CropCatalog, CultivationLayout, NullCropCatalog,
    NurseryLayout,
};
use canopy_registry::{AllocationDirectory, ContainerLookup, UnitFilter};
use canopy_snapshot::{SnapshotStore, UnitState};

use crate::lifecycle;

/// Opaque authorization context.
///
/// Supplied by the caller's auth layer and threaded through unchanged —
/// this core never interprets it.
#[derive(Debug, Clone)]
pub struct AuthContext(serde_json::Value);

impl AuthContext {
    /// Wrap an opaque claims payload.
    pub fn new(claims: serde_json::Value) -> Self {
        Self(claims)
    }

    /// An empty context, for callers without an auth layer.
    pub fn anonymous() -> Self {
        Self(serde_json::Value::Null)
    }

    /// The opaque payload, returned exactly as supplied.
    pub fn claims(&self) -> &serde_json::Value {
        &self.0
    }
}

/// A request to provision a new unit.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    /// Tray or panel.
    pub kind: UnitKind,
    /// The RFID tag to bind; validated and canonicalized by the service.
    pub rfid_tag: String,
    /// Crop capacity; defaults by kind when absent.
    pub capacity: Option<u16>,
    /// Free-form operator notes.
    pub notes: Option<String>,
    /// Preferred slot to place the fresh unit into, if any.
    pub initial_slot: Option<SlotRef>,
}

/// The result of provisioning a unit.
///
/// Soft contract: when the preferred `initial_slot` cannot be claimed,
/// the unit is still created and left unplaced — a freshly bound tag is
/// never discarded just because its preferred slot was taken. The
/// placement failure rides along for the caller to inspect.
#[derive(Debug)]
pub struct ProvisionOutcome {
    /// The created unit (placed or unplaced).
    pub unit: Unit,
    /// Why the preferred slot was not claimed, when it was not.
    pub placement_failure: Option<GridError>,
}

impl ProvisionOutcome {
    /// Whether the unit ended up holding a slot.
    pub fn is_placed(&self) -> bool {
        !self.unit.placement.is_unplaced()
    }
}

/// The result of retiring a unit.
#[derive(Debug)]
pub struct RetireOutcome {
    /// The retired unit record.
    pub unit: Unit,
    /// How many crop placements were force-unassigned. Callers can audit
    /// unexpected force-unassignments from this count.
    pub cleared_crops: usize,
}

/// One available slot, with its human-readable description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotListing {
    /// The slot address.
    pub slot: SlotRef,
    /// Description, e.g. `"Upper shelf, slot 3"`.
    pub description: String,
}

/// The allocation service: container directory, snapshot store, and the
/// collaborator seams, behind one cloneable handle.
#[derive(Clone)]
pub struct AllocationService {
    directory: Arc<AllocationDirectory>,
    snapshots: Arc<SnapshotStore>,
    containers: Arc<dyn ContainerLookup + Send + Sync>,
    catalog: Arc<dyn CropCatalog + Send + Sync>,
}

impl AllocationService {
    /// Create a service over the given collaborators.
    pub fn new(
        containers: Arc<dyn ContainerLookup + Send + Sync>,
        catalog: Arc<dyn CropCatalog + Send + Sync>,
    ) -> Self {
        Self {
            directory: Arc::new(AllocationDirectory::new()),
            snapshots: Arc::new(SnapshotStore::new()),
            containers,
            catalog,
        }
    }

    /// Create a service with no crop enrichment.
    pub fn without_catalog(containers: Arc<dyn ContainerLookup + Send + Sync>) -> Self {
        Self::new(containers, Arc::new(NullCropCatalog))
    }

    /// The snapshot store (shared handle).
    pub fn snapshots(&self) -> &Arc<SnapshotStore> {
        &self.snapshots
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Provision a new unit, optionally placing it into a preferred slot.
    ///
    /// The unit record is created first; a failed preferred placement
    /// leaves the unit unplaced rather than failing the whole operation
    /// (see [`ProvisionOutcome`]).
    ///
    /// # Errors
    ///
    /// - `Validation` if the RFID tag is malformed.
    /// - `Conflict` if the tag is already bound in this container.
    /// - `NotFound` if the container does not exist.
    pub fn provision_unit(
        &self,
        _ctx: &AuthContext,
        container_id: ContainerId,
        request: ProvisionRequest,
    ) -> Result<ProvisionOutcome, AllocationError> {
        self.require_container(container_id)?;
        let rfid_tag = RfidTag::new(request.rfid_tag)?;

        let cell = self.directory.ensure(container_id);
        let (unit, placement_failure, captured) = {
            let mut state = cell.lock();
            let unit =
                state
                    .registry
                    .provision(request.kind, rfid_tag, request.capacity, request.notes)?;

            let mut placement_failure = None;
            let unit = match request.initial_slot {
                Some(slot) => match state.grid.place(unit.id, slot) {
                    Ok(()) => state.registry.update(unit.id, |u| {
                        u.placement = slot.into();
                        u.status = UnitStatus::InUse;
                    })?,
                    Err(err) => {
                        placement_failure = Some(err);
                        unit
                    }
                },
                None => unit,
            };

            let captured = UnitState::capture(&unit, Vec::new());
            (unit, placement_failure, captured)
        };

        self.directory.note_unit(unit.id, container_id);
        self.snapshots.record(unit.id, captured);

        match &placement_failure {
            None => tracing::info!(
                unit_id = %unit.id,
                %container_id,
                location = %unit.location_display(),
                "provisioned unit"
            ),
            Some(err) => tracing::warn!(
                unit_id = %unit.id,
                %container_id,
                error = %err,
                "provisioned unit unplaced; preferred slot unavailable"
            ),
        }

        Ok(ProvisionOutcome {
            unit,
            placement_failure,
        })
    }

    /// Place an unplaced unit into a slot. Same operation as
    /// [`move_unit`]; the name matches the workflow's first-placement
    /// step.
    ///
    /// [`move_unit`]: AllocationService::move_unit
    pub fn place_unit(
        &self,
        ctx: &AuthContext,
        unit_id: UnitId,
        slot: SlotRef,
    ) -> Result<Unit, AllocationError> {
        self.move_unit(ctx, unit_id, slot)
    }

    /// Move a unit to a slot, with round-trip safety: if the destination
    /// is occupied, the unit keeps its original slot and the error is
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the unit does not exist.
    /// - `Conflict` if the slot is occupied or the unit is retired.
    pub fn move_unit(
        &self,
        _ctx: &AuthContext,
        unit_id: UnitId,
        slot: SlotRef,
    ) -> Result<Unit, AllocationError> {
        let cell = self
            .directory
            .locate_unit(unit_id)
            .ok_or(RegistryError::UnknownUnit(unit_id))?;

        let (unit, captured) = {
            let mut state = cell.lock();
            let current = state
                .registry
                .get(unit_id)
                .ok_or(RegistryError::UnknownUnit(unit_id))?;
            lifecycle::check_transition(unit_id, current.status, UnitStatus::InUse)?;

            state.grid.relocate(unit_id, slot)?;
            let unit = state.registry.update(unit_id, |u| {
                u.placement = slot.into();
                u.status = UnitStatus::InUse;
            })?;

            let crops = state.crops.crops_of(unit_id);
            let captured = UnitState::capture(&unit, crops);
            (unit, captured)
        };

        self.snapshots.record(unit_id, captured);
        tracing::info!(
            %unit_id,
            container_id = %unit.container_id,
            location = %unit.location_display(),
            "moved unit"
        );
        Ok(unit)
    }

    /// Park a unit off-grid: vacate its slot, keep its crops, status
    /// `Storage`.
    pub fn send_to_storage(
        &self,
        _ctx: &AuthContext,
        unit_id: UnitId,
    ) -> Result<Unit, AllocationError> {
        let cell = self
            .directory
            .locate_unit(unit_id)
            .ok_or(RegistryError::UnknownUnit(unit_id))?;

        let (unit, captured) = {
            let mut state = cell.lock();
            let current = state
                .registry
                .get(unit_id)
                .ok_or(RegistryError::UnknownUnit(unit_id))?;
            lifecycle::check_transition(unit_id, current.status, UnitStatus::Storage)?;

            state.grid.vacate(unit_id);
            let unit = state.registry.update(unit_id, |u| {
                u.placement = Placement::Unplaced;
                u.status = UnitStatus::Storage;
            })?;

            let crops = state.crops.crops_of(unit_id);
            let captured = UnitState::capture(&unit, crops);
            (unit, captured)
        };

        self.snapshots.record(unit_id, captured);
        tracing::info!(%unit_id, container_id = %unit.container_id, "sent unit to storage");
        Ok(unit)
    }

    /// Retire a unit: vacate its slot, force-unassign all of its crop
    /// placements, status `Retired`. The unit record and its snapshots
    /// persist. There is no "has active crops" guard — retiring always
    /// succeeds from a non-terminal status.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the unit does not exist.
    /// - `Conflict` if the unit is already retired.
    pub fn retire_unit(
        &self,
        _ctx: &AuthContext,
        unit_id: UnitId,
    ) -> Result<RetireOutcome, AllocationError> {
        let cell = self
            .directory
            .locate_unit(unit_id)
            .ok_or(RegistryError::UnknownUnit(unit_id))?;

        let (unit, cleared, captured) = {
            let mut state = cell.lock();
            let current = state
                .registry
                .get(unit_id)
                .ok_or(RegistryError::UnknownUnit(unit_id))?;
            lifecycle::check_transition(unit_id, current.status, UnitStatus::Retired)?;

            state.grid.vacate(unit_id);
            let cleared = state.crops.clear_unit(unit_id);
            let unit = state.registry.update(unit_id, |u| {
                u.placement = Placement::Unplaced;
                u.status = UnitStatus::Retired;
            })?;

            let captured = UnitState::capture(&unit, Vec::new());
            (unit, cleared, captured)
        };

        for placement in &cleared {
            self.directory.forget_crop(placement.crop_id);
        }
        self.snapshots.record(unit_id, captured);
        tracing::info!(
            %unit_id,
            container_id = %unit.container_id,
            cleared_crops = cleared.len(),
            "retired unit"
        );

        Ok(RetireOutcome {
            unit,
            cleared_crops: cleared.len(),
        })
    }

    /// Assign a crop to a unit sub-coordinate.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the unit does not exist.
    /// - `Validation` if the coordinate shape does not match the unit kind.
    /// - `Conflict` if the coordinate is taken, the crop is already
    ///   placed, or the unit is retired.
    pub fn assign_crop(
        &self,
        _ctx: &AuthContext,
        crop_id: CropId,
        unit_id: UnitId,
        coordinate: CropCoordinate,
    ) -> Result<CropPlacement, AllocationError> {
        let cell = self
            .directory
            .locate_unit(unit_id)
            .ok_or(RegistryError::UnknownUnit(unit_id))?;
        let container_id = cell.container_id();

        let (placement, captured) = {
            let mut state = cell.lock();
            let unit = state
                .registry
                .get(unit_id)
                .ok_or(RegistryError::UnknownUnit(unit_id))?;
            if unit.is_retired() {
                return Err(WorkflowError::UnitRetired(unit_id).into());
            }
            if !coordinate.matches_kind(unit.kind) {
                return Err(CropError::CoordinateKindMismatch {
                    unit_id,
                    coordinate,
                }
                .into());
            }

            let placement = state.crops.assign(crop_id, unit_id, coordinate)?;
            let crops = state.crops.crops_of(unit_id);
            let captured = UnitState::capture(&unit, crops);
            (placement, captured)
        };

        self.directory.note_crop(crop_id, container_id);
        self.snapshots.record(unit_id, captured);
        tracing::info!(%crop_id, %unit_id, coordinate = %placement.coordinate, "assigned crop");
        Ok(placement)
    }

    /// Remove a crop's assignment. Idempotent: unassigning an unplaced
    /// crop returns `None`.
    pub fn unassign_crop(
        &self,
        _ctx: &AuthContext,
        crop_id: CropId,
    ) -> Result<Option<CropPlacement>, AllocationError> {
        let Some(cell) = self.directory.locate_crop(crop_id) else {
            return Ok(None);
        };

        let (removed, captured) = {
            let mut state = cell.lock();
            let removed = state.crops.unassign(crop_id);
            let captured = removed.as_ref().and_then(|placement| {
                state.registry.get(placement.unit_id).map(|unit| {
                    let crops = state.crops.crops_of(placement.unit_id);
                    (placement.unit_id, UnitState::capture(&unit, crops))
                })
            });
            (removed, captured)
        };

        self.directory.forget_crop(crop_id);
        if let Some((unit_id, state)) = captured {
            self.snapshots.record(unit_id, state);
            tracing::info!(%crop_id, %unit_id, "unassigned crop");
        }
        Ok(removed)
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// A unit record by id.
    pub fn get_unit(&self, unit_id: UnitId) -> Option<Unit> {
        let cell = self.directory.locate_unit(unit_id)?;
        let state = cell.lock();
        state.registry.get(unit_id)
    }

    /// Units of a container matching the filter, ordered by provisioning
    /// time.
    pub fn list_units(
        &self,
        container_id: ContainerId,
        filter: UnitFilter,
    ) -> Result<Vec<Unit>, AllocationError> {
        self.require_container(container_id)?;
        Ok(self
            .directory
            .get(container_id)
            .map(|cell| cell.lock().registry.list(filter))
            .unwrap_or_default())
    }

    /// Crops of a unit, ordered by coordinate.
    pub fn crops_of(&self, unit_id: UnitId) -> Vec<CropPlacement> {
        self.directory
            .locate_unit(unit_id)
            .map(|cell| cell.lock().crops.crops_of(unit_id))
            .unwrap_or_default()
    }

    /// The unit occupying a slot, if any.
    pub fn occupant_at(
        &self,
        container_id: ContainerId,
        slot: SlotRef,
    ) -> Result<Option<UnitId>, AllocationError> {
        self.require_container(container_id)?;
        Ok(self
            .directory
            .get(container_id)
            .and_then(|cell| cell.lock().grid.occupant_at(slot)))
    }

    /// All unoccupied slots of a zone, with human-readable descriptions,
    /// ordered by axis then slot index.
    pub fn available_slots(
        &self,
        container_id: ContainerId,
        zone: Zone,
    ) -> Result<Vec<SlotListing>, AllocationError> {
        self.require_container(container_id)?;
        let slots = match self.directory.get(container_id) {
            Some(cell) => cell.lock().grid.available_slots(zone),
            // No allocation state yet: every slot of the zone is free.
            None => zone.slot_refs(),
        };
        Ok(slots
            .into_iter()
            .map(|slot| SlotListing {
                description: slot.description(),
                slot,
            })
            .collect())
    }

    /// The nursery layout of a container — live, or at a historical
    /// instant when `at` is supplied.
    ///
    /// # Errors
    ///
    /// `NotFound` if the container does not exist. An existing container
    /// with no units projects an empty layout, never an error.
    pub fn nursery_layout(
        &self,
        container_id: ContainerId,
        at: Option<Timestamp>,
    ) -> Result<NurseryLayout, AllocationError> {
        self.require_container(container_id)?;
        let states = self.unit_states(container_id, at);
        Ok(project_nursery(
            container_id,
            &states,
            self.catalog.as_ref(),
        ))
    }

    /// The cultivation layout of a container — live, or at a historical
    /// instant when `at` is supplied.
    pub fn cultivation_layout(
        &self,
        container_id: ContainerId,
        at: Option<Timestamp>,
    ) -> Result<CultivationLayout, AllocationError> {
        self.require_container(container_id)?;
        let states = self.unit_states(container_id, at);
        Ok(project_cultivation(
            container_id,
            &states,
            self.catalog.as_ref(),
        ))
    }

    // ── Internals ────────────────────────────────────────────────────

    fn require_container(&self, container_id: ContainerId) -> Result<(), AllocationError> {
        if !self.containers.contains_container(&container_id) {
            return Err(ServiceError::UnknownContainer(container_id).into());
        }
        Ok(())
    }

    /// Unit states for projection: live registry reads, or snapshot
    /// reconstruction when `at` is supplied. Units with no snapshot at or
    /// before `at` did not exist yet and are omitted.
    fn unit_states(
        &self,
        container_id: ContainerId,
        at: Option<Timestamp>,
    ) -> Vec<(UnitId, UnitState)> {
        let Some(cell) = self.directory.get(container_id) else {
            return Vec::new();
        };

        match at {
            None => {
                let state = cell.lock();
                state
                    .registry
                    .list(UnitFilter::default())
                    .into_iter()
                    .map(|unit| {
                        let crops = state.crops.crops_of(unit.id);
                        (unit.id, UnitState::capture(&unit, crops))
                    })
                    .collect()
            }
            Some(timestamp) => {
                // Collect ids under the lock, read history outside it.
                let unit_ids: Vec<UnitId> = {
                    let state = cell.lock();
                    state
                        .registry
                        .list(UnitFilter::default())
                        .into_iter()
                        .map(|unit| unit.id)
                        .collect()
                };
                unit_ids
                    .into_iter()
                    .filter_map(|unit_id| {
                        self.snapshots
                            .at_or_before(unit_id, timestamp)
                            .map(|snapshot| (unit_id, snapshot.state))
                    })
                    .collect()
            }
        }
    }
}
