//! # Layout Projector
//!
//! Enumerates a container's unit states and buckets each one: a unit
//! whose placement lands in the projected zone fills its slot; every
//! other unit (unplaced or placed in the other zone) lands in overflow.
//! Out-of-range placements cannot occur — the placement type rejects them
//! at construction.
//!
//! Retired units are excluded entirely: their records and snapshots
//! persist, but they no longer belong to any layout.

use std::collections::BTreeMap;
use std::collections::HashMap;

use canopy_core::{percent_round_half_up, ContainerId, SlotRef, UnitId, UnitKind, Zone};
use canopy_snapshot::UnitState;

use crate::views::{
    CropCatalog, CropComposition, CropView, CultivationLayout, NurseryLayout, SlotView,
    UnitView, WallView,
};

/// Project the nursery layout of a container from unit states.
///
/// The caller supplies the states — live registry reads or historical
/// snapshot reads — in listing order; bucketing preserves that order for
/// the off-shelf list.
pub fn project_nursery(
    container_id: ContainerId,
    units: &[(UnitId, UnitState)],
    catalog: &dyn CropCatalog,
) -> NurseryLayout {
    let (filled, off_shelf) = bucket(units, Zone::Nursery, catalog);

    let mut slot_views: HashMap<SlotRef, UnitView> = filled;
    let all = Zone::Nursery.slot_refs();
    let (upper_refs, lower_refs) = all.split_at(all.len() / 2);

    let occupied = slot_views.len();
    let total = Zone::Nursery.total_slots();

    NurseryLayout {
        container_id,
        upper: to_slot_views(upper_refs, &mut slot_views),
        lower: to_slot_views(lower_refs, &mut slot_views),
        off_shelf,
        occupied_slots: occupied,
        total_slots: total,
        utilization_pct: percent_round_half_up(occupied, total),
    }
}

/// Project the cultivation layout of a container from unit states.
pub fn project_cultivation(
    container_id: ContainerId,
    units: &[(UnitId, UnitState)],
    catalog: &dyn CropCatalog,
) -> CultivationLayout {
    let (filled, overflow) = bucket(units, Zone::Cultivation, catalog);

    let mut slot_views: HashMap<SlotRef, UnitView> = filled;
    let all = Zone::Cultivation.slot_refs();
    let per_wall = Zone::Cultivation.bound() as usize;

    let occupied = slot_views.len();
    let total = Zone::Cultivation.total_slots();

    let walls = canopy_core::Wall::ALL
        .iter()
        .enumerate()
        .map(|(index, wall)| WallView {
            wall: *wall,
            slots: to_slot_views(
                &all[index * per_wall..(index + 1) * per_wall],
                &mut slot_views,
            ),
        })
        .collect();

    CultivationLayout {
        container_id,
        walls,
        overflow,
        occupied_slots: occupied,
        total_slots: total,
        utilization_pct: percent_round_half_up(occupied, total),
    }
}

/// Split unit states into slot-filling views for `zone` and the overflow
/// bucket. Retired units are dropped. If two historical states claim the
/// same slot, the first (in listing order) fills it and the rest overflow.
fn bucket(
    units: &[(UnitId, UnitState)],
    zone: Zone,
    catalog: &dyn CropCatalog,
) -> (HashMap<SlotRef, UnitView>, Vec<UnitView>) {
    let mut filled: HashMap<SlotRef, UnitView> = HashMap::new();
    let mut overflow = Vec::new();

    for (unit_id, state) in units {
        if state.status.is_terminal() {
            continue;
        }
        let view = unit_view(*unit_id, state, catalog);
        match state.placement.slot_ref() {
            Some(slot) if slot.zone() == zone => {
                if filled.contains_key(&slot) {
                    overflow.push(view);
                } else {
                    filled.insert(slot, view);
                }
            }
            _ => overflow.push(view),
        }
    }

    (filled, overflow)
}

/// Build the view of one unit, resolving crop composition by kind.
fn unit_view(unit_id: UnitId, state: &UnitState, catalog: &dyn CropCatalog) -> UnitView {
    let mut crops = state.crops.clone();
    crops.sort_by_key(|placement| placement.coordinate);

    let crop_views: Vec<CropView> = crops
        .iter()
        .map(|placement| CropView {
            crop_id: placement.crop_id,
            coordinate: placement.coordinate,
            assigned_at: placement.assigned_at,
            detail: catalog.describe(&placement.crop_id),
        })
        .collect();

    let composition = match state.kind {
        UnitKind::Tray => CropComposition::Cells(crop_views),
        UnitKind::Panel => {
            let mut channels: BTreeMap<u16, Vec<CropView>> = BTreeMap::new();
            for view in crop_views {
                if let Some(channel) = view.coordinate.channel() {
                    channels.entry(channel).or_default().push(view);
                }
            }
            CropComposition::Channels(channels)
        }
    };

    let location_display = match state.placement.slot_ref() {
        Some(slot) => format!("{}: {}", slot.zone().label(), slot.description()),
        None => "Unplaced".to_string(),
    };

    UnitView {
        id: unit_id,
        rfid_tag: state.rfid_tag.clone(),
        kind: state.kind,
        status: state.status,
        placement: state.placement,
        location_display,
        capacity: state.capacity,
        crop_count: state.crop_count,
        fill_pct: state.fill_pct,
        crops: composition,
    }
}

/// Materialize slot views for a run of slot addresses, consuming the
/// filled map.
fn to_slot_views(refs: &[SlotRef], filled: &mut HashMap<SlotRef, UnitView>) -> Vec<SlotView> {
    refs.iter()
        .map(|slot| SlotView {
            slot: *slot,
            occupant: filled.remove(slot),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::{
        CropCoordinate, CropId, CropPlacement, Placement, RfidTag, Shelf, Timestamp, UnitStatus,
        Wall,
    };
    use canopy_snapshot::UnitState;

    use crate::views::{CropDetail, NullCropCatalog};

    fn state(kind: UnitKind, status: UnitStatus, placement: Placement) -> UnitState {
        UnitState {
            rfid_tag: RfidTag::new("RFID001").unwrap(),
            kind,
            status,
            placement,
            capacity: 4,
            crops: Vec::new(),
            crop_count: 0,
            fill_pct: 0,
        }
    }

    fn placed_tray(shelf: Shelf, slot: u16) -> (UnitId, UnitState) {
        (
            UnitId::new(),
            state(
                UnitKind::Tray,
                UnitStatus::InUse,
                SlotRef::nursery(shelf, slot).unwrap().into(),
            ),
        )
    }

    // ── Nursery projection ───────────────────────────────────────────

    #[test]
    fn three_placed_one_off_shelf_is_19_pct() {
        let units = vec![
            placed_tray(Shelf::Upper, 1),
            placed_tray(Shelf::Upper, 2),
            placed_tray(Shelf::Lower, 5),
            (
                UnitId::new(),
                state(UnitKind::Tray, UnitStatus::Provisioned, Placement::Unplaced),
            ),
        ];

        let layout = project_nursery(ContainerId::new(), &units, &NullCropCatalog);
        assert_eq!(layout.occupied_slots, 3);
        assert_eq!(layout.total_slots, 16);
        assert_eq!(layout.utilization_pct, 19);
        assert_eq!(layout.off_shelf.len(), 1);
        assert_eq!(layout.upper.len(), 8);
        assert_eq!(layout.lower.len(), 8);
        assert!(layout.upper[0].occupant.is_some());
        assert!(layout.upper[1].occupant.is_some());
        assert!(layout.upper[2].occupant.is_none());
        assert!(layout.lower[4].occupant.is_some());
    }

    #[test]
    fn unit_in_other_zone_is_off_shelf_not_error() {
        let cultivated = (
            UnitId::new(),
            state(
                UnitKind::Panel,
                UnitStatus::InUse,
                SlotRef::cultivation(Wall::Wall1, 3).unwrap().into(),
            ),
        );

        let layout = project_nursery(ContainerId::new(), &[cultivated], &NullCropCatalog);
        assert_eq!(layout.occupied_slots, 0);
        assert_eq!(layout.off_shelf.len(), 1);
        assert_eq!(layout.utilization_pct, 0);
    }

    #[test]
    fn retired_units_are_excluded() {
        let retired = (
            UnitId::new(),
            state(UnitKind::Tray, UnitStatus::Retired, Placement::Unplaced),
        );
        let layout = project_nursery(ContainerId::new(), &[retired], &NullCropCatalog);
        assert!(layout.off_shelf.is_empty());
        assert_eq!(layout.occupied_slots, 0);
    }

    #[test]
    fn duplicate_historical_slot_claims_overflow() {
        // Two snapshot states claiming the same slot can occur in
        // point-in-time reads; the projector treats the second as overflow.
        let a = placed_tray(Shelf::Upper, 1);
        let b = placed_tray(Shelf::Upper, 1);

        let layout = project_nursery(ContainerId::new(), &[a, b], &NullCropCatalog);
        assert_eq!(layout.occupied_slots, 1);
        assert_eq!(layout.off_shelf.len(), 1);
    }

    // ── Cultivation projection ───────────────────────────────────────

    #[test]
    fn cultivation_walls_have_22_slots_each() {
        let unit = (
            UnitId::new(),
            state(
                UnitKind::Panel,
                UnitStatus::InUse,
                SlotRef::cultivation(Wall::Wall2, 17).unwrap().into(),
            ),
        );

        let layout = project_cultivation(ContainerId::new(), &[unit], &NullCropCatalog);
        assert_eq!(layout.walls.len(), 4);
        for wall_view in &layout.walls {
            assert_eq!(wall_view.slots.len(), 22);
        }
        assert_eq!(layout.total_slots, 88);
        assert_eq!(layout.occupied_slots, 1);
        assert_eq!(layout.utilization_pct, 1);
        assert!(layout.walls[1].slots[16].occupant.is_some());
    }

    // ── Crop composition ─────────────────────────────────────────────

    #[test]
    fn tray_crops_flatten_and_panel_crops_group() {
        let tray_id = UnitId::new();
        let mut tray_state = state(UnitKind::Tray, UnitStatus::InUse, Placement::Unplaced);
        tray_state.crops = vec![
            CropPlacement {
                crop_id: CropId::new(),
                unit_id: tray_id,
                coordinate: CropCoordinate::Cell { row: 2, column: 1 },
                assigned_at: Timestamp::now(),
            },
            CropPlacement {
                crop_id: CropId::new(),
                unit_id: tray_id,
                coordinate: CropCoordinate::Cell { row: 1, column: 1 },
                assigned_at: Timestamp::now(),
            },
        ];
        tray_state.crop_count = 2;

        let panel_id = UnitId::new();
        let mut panel_state = state(UnitKind::Panel, UnitStatus::InUse, Placement::Unplaced);
        panel_state.crops = vec![
            CropPlacement {
                crop_id: CropId::new(),
                unit_id: panel_id,
                coordinate: CropCoordinate::Channel {
                    channel: 2,
                    position: 1,
                },
                assigned_at: Timestamp::now(),
            },
            CropPlacement {
                crop_id: CropId::new(),
                unit_id: panel_id,
                coordinate: CropCoordinate::Channel {
                    channel: 1,
                    position: 1,
                },
                assigned_at: Timestamp::now(),
            },
        ];
        panel_state.crop_count = 2;

        let layout = project_nursery(
            ContainerId::new(),
            &[(tray_id, tray_state), (panel_id, panel_state)],
            &NullCropCatalog,
        );

        assert_eq!(layout.off_shelf.len(), 2);
        match &layout.off_shelf[0].crops {
            CropComposition::Cells(crops) => {
                assert_eq!(crops.len(), 2);
                // Ordered by coordinate.
                assert_eq!(
                    crops[0].coordinate,
                    CropCoordinate::Cell { row: 1, column: 1 }
                );
            }
            other => panic!("expected Cells, got: {other:?}"),
        }
        match &layout.off_shelf[1].crops {
            CropComposition::Channels(channels) => {
                assert_eq!(channels.len(), 2);
                assert!(channels.contains_key(&1));
                assert!(channels.contains_key(&2));
            }
            other => panic!("expected Channels, got: {other:?}"),
        }
    }

    #[test]
    fn catalog_decorates_crop_views() {
        struct OneCrop(CropId);
        impl CropCatalog for OneCrop {
            fn describe(&self, crop_id: &CropId) -> Option<CropDetail> {
                (*crop_id == self.0).then(|| CropDetail {
                    seed_type: "butterhead".to_string(),
                    lifecycle_status: "vegetative".to_string(),
                    health_status: None,
                })
            }
        }

        let unit_id = UnitId::new();
        let crop_id = CropId::new();
        let mut unit_state = state(UnitKind::Tray, UnitStatus::InUse, Placement::Unplaced);
        unit_state.crops = vec![CropPlacement {
            crop_id,
            unit_id,
            coordinate: CropCoordinate::Cell { row: 1, column: 1 },
            assigned_at: Timestamp::now(),
        }];
        unit_state.crop_count = 1;

        let layout = project_nursery(ContainerId::new(), &[(unit_id, unit_state)], &OneCrop(crop_id));
        match &layout.off_shelf[0].crops {
            CropComposition::Cells(crops) => {
                let detail = crops[0].detail.as_ref().unwrap();
                assert_eq!(detail.seed_type, "butterhead");
            }
            other => panic!("expected Cells, got: {other:?}"),
        }
    }

    // ── Empty container ──────────────────────────────────────────────

    #[test]
    fn empty_container_projects_empty_layout() {
        let layout = project_nursery(ContainerId::new(), &[], &NullCropCatalog);
        assert_eq!(layout.occupied_slots, 0);
        assert_eq!(layout.utilization_pct, 0);
        assert!(layout.off_shelf.is_empty());
        assert!(layout.upper.iter().all(|slot| slot.occupant.is_none()));
    }
}
