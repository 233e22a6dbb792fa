//! # Snapshot Store
//!
//! Per-unit append-only history. The store is shared (`RwLock` interior)
//! and synchronous: `parking_lot`, never held across anything slower than
//! a map insert.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use canopy_core::{
    percent_round_half_up, CropPlacement, Placement, RfidTag, SnapshotId, Timestamp, Unit,
    UnitId, UnitKind, UnitStatus,
};

/// The serialized state of a unit at a moment in time.
///
/// Carries everything the layout projector needs to reconstruct a
/// historical view: kind, status, placement, capacity, and the full crop
/// assignment list, plus the derived `crop_count` and `fill_pct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitState {
    /// The RFID tag the unit carried when captured.
    pub rfid_tag: RfidTag,
    /// Tray or panel.
    pub kind: UnitKind,
    /// Lifecycle status at capture time.
    pub status: UnitStatus,
    /// Placement at capture time.
    pub placement: Placement,
    /// Crop capacity of the unit.
    pub capacity: u16,
    /// Crop assignments at capture time.
    pub crops: Vec<CropPlacement>,
    /// Number of assigned crops. Derived from `crops`.
    pub crop_count: usize,
    /// Crop fill percentage (`crop_count` over `capacity`, round half-up).
    pub fill_pct: u8,
}

impl UnitState {
    /// Capture a unit's current state together with its crop assignments.
    pub fn capture(unit: &Unit, crops: Vec<CropPlacement>) -> Self {
        let crop_count = crops.len();
        Self {
            rfid_tag: unit.rfid_tag.clone(),
            kind: unit.kind,
            status: unit.status,
            placement: unit.placement,
            capacity: unit.capacity,
            crops,
            crop_count,
            fill_pct: percent_round_half_up(crop_count, unit.capacity as usize),
        }
    }
}

/// An immutable, timestamped record of a unit's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Unique snapshot identifier.
    pub id: SnapshotId,
    /// The unit this snapshot describes.
    pub unit_id: UnitId,
    /// When the state was captured.
    pub timestamp: Timestamp,
    /// The captured state.
    pub state: UnitState,
}

/// Append-only snapshot history, keyed by unit.
///
/// No retention policy is applied by default: history grows without bound,
/// matching the v1 system's behavior. [`prune_before`] exists as an
/// explicit operator control for deployments where that growth matters.
///
/// [`prune_before`]: SnapshotStore::prune_before
#[derive(Debug, Default)]
pub struct SnapshotStore {
    entries: RwLock<HashMap<UnitId, Vec<Snapshot>>>,
}

impl SnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot of `state` at the current time.
    pub fn record(&self, unit_id: UnitId, state: UnitState) -> SnapshotId {
        self.record_at(unit_id, Timestamp::now(), state)
    }

    /// Append a snapshot of `state` at an explicit timestamp.
    ///
    /// Used by fixture loading and tests that need deterministic history.
    /// Entries are kept in ascending timestamp order; an entry equal in
    /// timestamp to an existing one sorts after it, so `at_or_before`
    /// resolves ties to the most recently appended state.
    pub fn record_at(&self, unit_id: UnitId, timestamp: Timestamp, state: UnitState) -> SnapshotId {
        let snapshot = Snapshot {
            id: SnapshotId::new(),
            unit_id,
            timestamp,
            state,
        };
        let id = snapshot.id;

        let mut entries = self.entries.write();
        let history = entries.entry(unit_id).or_default();
        let position = history.partition_point(|existing| existing.timestamp <= timestamp);
        history.insert(position, snapshot);

        tracing::debug!(%unit_id, %timestamp, "recorded unit snapshot");
        id
    }

    /// The most recent snapshot not after `timestamp`, if any.
    pub fn at_or_before(&self, unit_id: UnitId, timestamp: Timestamp) -> Option<Snapshot> {
        let entries = self.entries.read();
        entries
            .get(&unit_id)?
            .iter()
            .rev()
            .find(|snapshot| snapshot.timestamp <= timestamp)
            .cloned()
    }

    /// All snapshots of a unit within `[start, end]`, ascending by
    /// timestamp.
    pub fn range(&self, unit_id: UnitId, start: Timestamp, end: Timestamp) -> Vec<Snapshot> {
        let entries = self.entries.read();
        entries
            .get(&unit_id)
            .map(|history| {
                history
                    .iter()
                    .filter(|snapshot| snapshot.timestamp >= start && snapshot.timestamp <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of snapshots recorded for a unit.
    pub fn history_len(&self, unit_id: UnitId) -> usize {
        self.entries
            .read()
            .get(&unit_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Every unit with at least one snapshot.
    pub fn tracked_units(&self) -> Vec<UnitId> {
        self.entries.read().keys().copied().collect()
    }

    /// Drop all snapshots of a unit strictly before `timestamp`.
    ///
    /// Explicit operator control, never invoked by normal operation.
    /// Returns the number of snapshots removed.
    pub fn prune_before(&self, unit_id: UnitId, timestamp: Timestamp) -> usize {
        let mut entries = self.entries.write();
        let Some(history) = entries.get_mut(&unit_id) else {
            return 0;
        };
        let keep_from = history.partition_point(|snapshot| snapshot.timestamp < timestamp);
        history.drain(..keep_from).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::{ContainerId, Shelf, SlotRef};

    fn tray_state(status: UnitStatus) -> UnitState {
        let mut unit = Unit::new(
            ContainerId::new(),
            UnitKind::Tray,
            RfidTag::new("RFID001").unwrap(),
            Some(4),
            None,
        );
        unit.status = status;
        UnitState::capture(&unit, Vec::new())
    }

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    // ── capture ──────────────────────────────────────────────────────

    #[test]
    fn capture_derives_counts() {
        let unit = Unit::new(
            ContainerId::new(),
            UnitKind::Tray,
            RfidTag::new("RFID001").unwrap(),
            Some(4),
            None,
        );
        let crops = vec![CropPlacement {
            crop_id: canopy_core::CropId::new(),
            unit_id: unit.id,
            coordinate: canopy_core::CropCoordinate::Cell { row: 1, column: 1 },
            assigned_at: Timestamp::now(),
        }];
        let state = UnitState::capture(&unit, crops);
        assert_eq!(state.crop_count, 1);
        assert_eq!(state.fill_pct, 25);
        assert_eq!(state.status, UnitStatus::Provisioned);
    }

    #[test]
    fn capture_includes_placement() {
        let mut unit = Unit::new(
            ContainerId::new(),
            UnitKind::Tray,
            RfidTag::new("RFID002").unwrap(),
            None,
            None,
        );
        unit.placement = SlotRef::nursery(Shelf::Upper, 3).unwrap().into();
        let state = UnitState::capture(&unit, Vec::new());
        assert_eq!(state.placement, unit.placement);
    }

    // ── record / at_or_before ────────────────────────────────────────

    #[test]
    fn snapshot_round_trip() {
        let store = SnapshotStore::new();
        let unit_id = UnitId::new();
        let state = tray_state(UnitStatus::Provisioned);
        let stamp = ts("2026-03-01T10:00:00Z");

        store.record_at(unit_id, stamp, state.clone());
        let found = store.at_or_before(unit_id, stamp).unwrap();
        assert_eq!(found.timestamp, stamp);
        assert_eq!(found.state, state);
    }

    #[test]
    fn at_or_before_picks_most_recent_not_after() {
        let store = SnapshotStore::new();
        let unit_id = UnitId::new();

        store.record_at(unit_id, ts("2026-03-01T10:00:00Z"), tray_state(UnitStatus::Provisioned));
        store.record_at(unit_id, ts("2026-03-02T10:00:00Z"), tray_state(UnitStatus::InUse));
        store.record_at(unit_id, ts("2026-03-03T10:00:00Z"), tray_state(UnitStatus::Retired));

        let found = store
            .at_or_before(unit_id, ts("2026-03-02T18:00:00Z"))
            .unwrap();
        assert_eq!(found.state.status, UnitStatus::InUse);
    }

    #[test]
    fn at_or_before_none_when_unit_did_not_exist_yet() {
        let store = SnapshotStore::new();
        let unit_id = UnitId::new();
        store.record_at(unit_id, ts("2026-03-05T10:00:00Z"), tray_state(UnitStatus::Provisioned));

        assert!(store
            .at_or_before(unit_id, ts("2026-03-04T10:00:00Z"))
            .is_none());
        assert!(store.at_or_before(UnitId::new(), ts("2026-03-06T10:00:00Z")).is_none());
    }

    #[test]
    fn equal_timestamps_resolve_to_latest_append() {
        let store = SnapshotStore::new();
        let unit_id = UnitId::new();
        let stamp = ts("2026-03-01T10:00:00Z");

        store.record_at(unit_id, stamp, tray_state(UnitStatus::Provisioned));
        store.record_at(unit_id, stamp, tray_state(UnitStatus::InUse));

        let found = store.at_or_before(unit_id, stamp).unwrap();
        assert_eq!(found.state.status, UnitStatus::InUse);
        assert_eq!(store.history_len(unit_id), 2);
    }

    #[test]
    fn out_of_order_appends_are_sorted() {
        let store = SnapshotStore::new();
        let unit_id = UnitId::new();

        store.record_at(unit_id, ts("2026-03-03T10:00:00Z"), tray_state(UnitStatus::Storage));
        store.record_at(unit_id, ts("2026-03-01T10:00:00Z"), tray_state(UnitStatus::Provisioned));

        let all = store.range(unit_id, ts("2026-01-01T00:00:00Z"), ts("2026-12-31T00:00:00Z"));
        assert_eq!(all.len(), 2);
        assert!(all[0].timestamp < all[1].timestamp);
    }

    // ── range ────────────────────────────────────────────────────────

    #[test]
    fn range_is_inclusive_and_ascending() {
        let store = SnapshotStore::new();
        let unit_id = UnitId::new();
        for day in ["01", "02", "03", "04"] {
            store.record_at(
                unit_id,
                ts(&format!("2026-03-{day}T10:00:00Z")),
                tray_state(UnitStatus::InUse),
            );
        }

        let window = store.range(
            unit_id,
            ts("2026-03-02T10:00:00Z"),
            ts("2026-03-03T10:00:00Z"),
        );
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].timestamp, ts("2026-03-02T10:00:00Z"));
        assert_eq!(window[1].timestamp, ts("2026-03-03T10:00:00Z"));
    }

    #[test]
    fn range_for_unknown_unit_is_empty() {
        let store = SnapshotStore::new();
        assert!(store
            .range(UnitId::new(), ts("2026-01-01T00:00:00Z"), ts("2026-12-31T00:00:00Z"))
            .is_empty());
    }

    // ── prune ────────────────────────────────────────────────────────

    #[test]
    fn prune_before_drops_older_history_only() {
        let store = SnapshotStore::new();
        let unit_id = UnitId::new();
        store.record_at(unit_id, ts("2026-03-01T10:00:00Z"), tray_state(UnitStatus::Provisioned));
        store.record_at(unit_id, ts("2026-03-02T10:00:00Z"), tray_state(UnitStatus::InUse));
        store.record_at(unit_id, ts("2026-03-03T10:00:00Z"), tray_state(UnitStatus::InUse));

        let removed = store.prune_before(unit_id, ts("2026-03-02T10:00:00Z"));
        assert_eq!(removed, 1);
        assert_eq!(store.history_len(unit_id), 2);
        // The boundary snapshot survives (strictly-before semantics).
        assert!(store.at_or_before(unit_id, ts("2026-03-02T10:00:00Z")).is_some());
    }

    #[test]
    fn tracked_units_lists_units_with_history() {
        let store = SnapshotStore::new();
        let a = UnitId::new();
        let b = UnitId::new();
        store.record(a, tray_state(UnitStatus::Provisioned));
        store.record(b, tray_state(UnitStatus::Provisioned));

        let tracked = store.tracked_units();
        assert_eq!(tracked.len(), 2);
        assert!(tracked.contains(&a));
        assert!(tracked.contains(&b));
    }
}
