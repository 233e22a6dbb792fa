//! # canopy-snapshot — Append-Only Unit History
//!
//! Every successful mutation of a unit appends an immutable, timestamped
//! [`Snapshot`] of its state. Snapshots are never mutated or deleted by
//! normal operation; they outlive the unit's retirement and back the
//! point-in-time layout views.
//!
//! ## Invariants
//!
//! - **Append-only**: `record` never overwrites an existing entry.
//! - **Ordered**: per-unit history is maintained in ascending timestamp
//!   order; equal timestamps resolve to the later append.
//! - **Independent locking**: snapshot writes take the store's own lock,
//!   never the container lock — no invariant spans both.

pub mod store;

pub use store::{Snapshot, SnapshotStore, UnitState};
