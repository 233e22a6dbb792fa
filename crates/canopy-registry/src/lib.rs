//! # canopy-registry — Unit Identity and Container State
//!
//! Owns the per-container allocation state: the unit registry (identity,
//! provisioning metadata, current placement reference), the crop index
//! (crop → unit sub-coordinate), and the slot grid, composed behind one
//! mutex per container.
//!
//! ## Locking Model
//!
//! Every allocation invariant (slot occupancy, coordinate uniqueness, tag
//! uniqueness) is scoped to a single container, so mutual exclusion is
//! keyed by `ContainerId`: the [`AllocationDirectory`] maps container ids
//! to [`ContainerCell`]s, and each cell wraps its [`AllocationState`] in a
//! `parking_lot::Mutex`. Operations on different containers never contend.
//! The critical section wraps only the check-then-write sequence — no I/O,
//! no long computation.

pub mod container;
pub mod crops;
pub mod registry;

pub use container::{
    AllocationDirectory, AllocationState, ContainerCell, ContainerLookup, FixedContainers,
};
pub use crops::CropIndex;
pub use registry::{UnitFilter, UnitRegistry};
