//! # canopy-core — Foundational Types for the Canopy Farm Stack
//!
//! This crate is the bedrock of the container-farm allocation core. It
//! defines the type-system primitives that make the allocation invariants
//! enforceable at compile time. Every other crate in the workspace depends
//! on `canopy-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `ContainerId`, `UnitId`,
//!    `CropId`, `SnapshotId`, `RfidTag` — all newtypes with validated
//!    constructors. No bare strings or UUIDs for identifiers.
//!
//! 2. **A single `Placement` variant.** `Unplaced | Nursery(shelf, slot) |
//!    Cultivation(wall, slot)` — an out-of-range or shapeless location is
//!    unrepresentable, replacing the duck-typed location dicts the v1
//!    system tolerated.
//!
//! 3. **Bounded slot indices.** A `SlotRef` can only be constructed through
//!    validating constructors that know each zone's bound (8 per shelf,
//!    22 per wall). Deserialization routes through the same constructors.
//!
//! 4. **UTC-only timestamps.** The `Timestamp` type enforces UTC with a
//!    `Z` suffix; snapshot ordering depends on it.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `canopy-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public data types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod crop;
pub mod error;
pub mod geometry;
pub mod identity;
pub mod temporal;
pub mod unit;

// Re-export primary types for ergonomic imports.
pub use crop::{CropCoordinate, CropPlacement};
pub use error::{
    AllocationError, CropError, ErrorKind, GridError, RegistryError, ServiceError,
    ValidationError, WorkflowError,
};
pub use geometry::{
    percent_round_half_up, Placement, Shelf, SlotRef, Wall, Zone, SHELF_SLOTS, WALL_SLOTS,
};
pub use identity::{ContainerId, CropId, RfidTag, SnapshotId, UnitId};
pub use temporal::Timestamp;
pub use unit::{Unit, UnitKind, UnitStatus};
