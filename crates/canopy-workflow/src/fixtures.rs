//! # Fixture Loading
//!
//! Seed state is loaded by an explicit step invoked once at startup — not
//! process-global mutable state. A fixture document enumerates containers,
//! their units, preferred placements, and crop assignments; loading routes
//! everything through the [`AllocationService`] so the usual invariants
//! and snapshot discipline apply.
//!
//! ## Legacy placement tolerance
//!
//! The v1 system tolerated malformed or legacy placement shapes by
//! treating them as off-grid. The fixture boundary preserves that
//! tolerance while making it observable: a placement that fails to parse
//! or validate is downgraded to unplaced with a `warn!`, and the
//! [`FixtureReport`] counts every downgrade. Inside the core, invalid
//! placements are unrepresentable.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use canopy_core::{
    AllocationError, ContainerId, CropCoordinate, CropId, Placement, UnitKind,
};

use crate::service::{AllocationService, AuthContext, ProvisionRequest};

/// Environment variable naming the fixture document path.
pub const FIXTURES_ENV_VAR: &str = "CANOPY_FIXTURES";

/// Errors during fixture loading.
#[derive(Error, Debug)]
pub enum FixtureError {
    /// The fixture file could not be read.
    #[error("failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// The fixture document is not valid JSON.
    #[error("failed to parse fixture document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A unit-level operation failed (duplicate tag, unknown container).
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// A crop assignment within a unit fixture.
#[derive(Debug, Clone, Deserialize)]
pub struct CropFixture {
    /// The crop to assign.
    pub crop_id: CropId,
    /// The sub-coordinate within the unit.
    pub coordinate: CropCoordinate,
}

/// One unit within a container fixture.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitFixture {
    /// Tray or panel.
    pub kind: UnitKind,
    /// The RFID tag to bind.
    pub rfid_tag: String,
    /// Crop capacity; defaults by kind when absent.
    #[serde(default)]
    pub capacity: Option<u16>,
    /// Operator notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Raw placement value. Kept as untyped JSON so legacy shapes can be
    /// inspected and downgraded instead of failing the whole document.
    #[serde(default)]
    pub placement: Option<serde_json::Value>,
    /// Crop assignments.
    #[serde(default)]
    pub crops: Vec<CropFixture>,
}

/// One container's seed state.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerFixture {
    /// The container to seed.
    pub container_id: ContainerId,
    /// Units to provision.
    #[serde(default)]
    pub units: Vec<UnitFixture>,
}

/// The whole fixture document.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureDocument {
    /// Containers to seed.
    pub containers: Vec<ContainerFixture>,
}

impl FixtureDocument {
    /// The container ids named by this document, for building the
    /// container lookup before loading.
    pub fn container_ids(&self) -> Vec<ContainerId> {
        self.containers
            .iter()
            .map(|container| container.container_id)
            .collect()
    }
}

/// What fixture loading did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FixtureReport {
    /// Containers seeded.
    pub containers: usize,
    /// Units provisioned.
    pub units: usize,
    /// Units that ended up holding their fixture slot.
    pub placed: usize,
    /// Placements downgraded to unplaced (malformed shape, out-of-range
    /// index, or occupied slot).
    pub downgraded_placements: usize,
    /// Crop assignments made.
    pub crops: usize,
    /// Crop assignments skipped (taken coordinate, wrong shape).
    pub skipped_crops: usize,
}

/// Load a fixture document through the service.
///
/// Unit-level failures (duplicate tag, unknown container) abort the load —
/// those are authoring errors. Placement and crop conflicts are tolerated
/// and counted, mirroring the v1 system's tolerance for messy seed data.
pub fn load_fixtures(
    service: &AllocationService,
    document: &FixtureDocument,
) -> Result<FixtureReport, AllocationError> {
    let ctx = AuthContext::anonymous();
    let mut report = FixtureReport {
        containers: document.containers.len(),
        ..FixtureReport::default()
    };

    for container in &document.containers {
        for unit_fixture in &container.units {
            let (initial_slot, downgraded) = parse_placement(unit_fixture);
            if downgraded {
                report.downgraded_placements += 1;
            }

            let outcome = service.provision_unit(
                &ctx,
                container.container_id,
                ProvisionRequest {
                    kind: unit_fixture.kind,
                    rfid_tag: unit_fixture.rfid_tag.clone(),
                    capacity: unit_fixture.capacity,
                    notes: unit_fixture.notes.clone(),
                    initial_slot,
                },
            )?;
            report.units += 1;
            if outcome.is_placed() {
                report.placed += 1;
            } else if outcome.placement_failure.is_some() {
                // The slot parsed but was taken; the soft contract already
                // logged it — count it with the other downgrades.
                report.downgraded_placements += 1;
            }

            for crop in &unit_fixture.crops {
                match service.assign_crop(&ctx, crop.crop_id, outcome.unit.id, crop.coordinate) {
                    Ok(_) => report.crops += 1,
                    Err(err) => {
                        report.skipped_crops += 1;
                        tracing::warn!(
                            crop_id = %crop.crop_id,
                            unit_id = %outcome.unit.id,
                            error = %err,
                            "skipped fixture crop assignment"
                        );
                    }
                }
            }
        }
    }

    tracing::info!(
        containers = report.containers,
        units = report.units,
        placed = report.placed,
        downgraded = report.downgraded_placements,
        crops = report.crops,
        "loaded fixtures"
    );
    Ok(report)
}

/// Load fixtures from a JSON file.
pub fn load_fixtures_from_path(
    service: &AllocationService,
    path: &Path,
) -> Result<FixtureReport, FixtureError> {
    let raw = std::fs::read_to_string(path)?;
    let document: FixtureDocument = serde_json::from_str(&raw)?;
    Ok(load_fixtures(service, &document)?)
}

/// Load fixtures from the path named by [`FIXTURES_ENV_VAR`].
///
/// When the variable is unset the service starts empty — a warning is
/// logged and `Ok(None)` returned.
pub fn load_fixtures_from_env(
    service: &AllocationService,
) -> Result<Option<FixtureReport>, FixtureError> {
    let path = match std::env::var(FIXTURES_ENV_VAR) {
        Ok(path) => path,
        Err(_) => {
            tracing::warn!(
                "{FIXTURES_ENV_VAR} not set — starting with empty allocation state"
            );
            return Ok(None);
        }
    };
    load_fixtures_from_path(service, Path::new(&path)).map(Some)
}

/// Resolve a fixture's raw placement value to a slot, downgrading
/// malformed or out-of-range shapes to unplaced.
///
/// Returns `(initial_slot, downgraded)`.
fn parse_placement(unit_fixture: &UnitFixture) -> (Option<canopy_core::SlotRef>, bool) {
    let Some(raw) = &unit_fixture.placement else {
        return (None, false);
    };

    match serde_json::from_value::<Placement>(raw.clone()) {
        Ok(placement) => (placement.slot_ref(), false),
        Err(err) => {
            tracing::warn!(
                rfid_tag = %unit_fixture.rfid_tag,
                error = %err,
                "downgraded malformed fixture placement to unplaced"
            );
            (None, true)
        }
    }
}
