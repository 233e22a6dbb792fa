//! # canopy-grid — Slot Occupancy for One Container
//!
//! Models the two fixed-capacity zone grids of a single container and
//! enforces the occupancy invariants:
//!
//! 1. a slot has at most one occupant;
//! 2. a unit has at most one placement;
//! 3. a slot index is always within its zone's bound (enforced upstream
//!    by [`SlotRef`] construction — an out-of-range address never reaches
//!    the grid).
//!
//! The grid is a passive data structure: it is owned by a per-container
//! allocation state and mutated only under that container's lock, so it
//! carries no locking of its own.
//!
//! [`SlotRef`]: canopy_core::SlotRef

pub mod grid;

pub use grid::SlotGrid;
