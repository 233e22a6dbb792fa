//! # Unit Registry
//!
//! Id-indexed unit records for one container, with a unique index on the
//! RFID tag. The registry is a plain data structure: it lives inside a
//! [`ContainerCell`](crate::ContainerCell) and is only touched under that
//! container's lock.

use std::collections::HashMap;

use canopy_core::{
    ContainerId, RegistryError, RfidTag, Timestamp, Unit, UnitId, UnitKind, UnitStatus, Zone,
};

/// Filter for unit listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitFilter {
    /// Keep only units with this status.
    pub status: Option<UnitStatus>,
    /// Keep only units placed in this zone. Unplaced units never match.
    pub zone: Option<Zone>,
}

/// Unit records for one container.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    container_id: ContainerId,
    units: HashMap<UnitId, Unit>,
    /// rfid_tag → unit. Unique index.
    tag_index: HashMap<RfidTag, UnitId>,
}

impl UnitRegistry {
    /// Create an empty registry for a container.
    pub fn new(container_id: ContainerId) -> Self {
        Self {
            container_id,
            units: HashMap::new(),
            tag_index: HashMap::new(),
        }
    }

    /// The container this registry belongs to.
    pub fn container_id(&self) -> ContainerId {
        self.container_id
    }

    /// Create a new unit record, unplaced, with status `Provisioned`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTag`] if the tag is already bound
    /// to a unit in this container.
    pub fn provision(
        &mut self,
        kind: UnitKind,
        rfid_tag: RfidTag,
        capacity: Option<u16>,
        notes: Option<String>,
    ) -> Result<Unit, RegistryError> {
        if let Some(existing) = self.tag_index.get(&rfid_tag) {
            return Err(RegistryError::DuplicateTag {
                tag: rfid_tag.as_str().to_string(),
                existing: *existing,
            });
        }

        let unit = Unit::new(self.container_id, kind, rfid_tag.clone(), capacity, notes);
        self.tag_index.insert(rfid_tag, unit.id);
        self.units.insert(unit.id, unit.clone());
        Ok(unit)
    }

    /// Retrieve a unit by id.
    pub fn get(&self, unit_id: UnitId) -> Option<Unit> {
        self.units.get(&unit_id).cloned()
    }

    /// Whether a tag is already bound in this container.
    pub fn contains_tag(&self, tag: &RfidTag) -> bool {
        self.tag_index.contains_key(tag)
    }

    /// Mutate a unit in place and return the updated record.
    ///
    /// `updated_at` is bumped after the closure runs, so callers only
    /// change the fields they mean to change.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownUnit`] if no unit with this id
    /// exists.
    pub fn update(
        &mut self,
        unit_id: UnitId,
        f: impl FnOnce(&mut Unit),
    ) -> Result<Unit, RegistryError> {
        let unit = self
            .units
            .get_mut(&unit_id)
            .ok_or(RegistryError::UnknownUnit(unit_id))?;
        f(unit);
        unit.updated_at = Timestamp::now();
        Ok(unit.clone())
    }

    /// List units matching the filter, ordered by provisioning time then id.
    pub fn list(&self, filter: UnitFilter) -> Vec<Unit> {
        let mut matched: Vec<Unit> = self
            .units
            .values()
            .filter(|unit| {
                filter.status.map_or(true, |status| unit.status == status)
                    && filter
                        .zone
                        .map_or(true, |zone| unit.placement.zone() == Some(zone))
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        matched
    }

    /// Number of units in this container (all statuses).
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether this container has no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
