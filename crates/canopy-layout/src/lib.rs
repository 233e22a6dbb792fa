//! # canopy-layout — Nursery and Cultivation Layout Projection
//!
//! Composes unit states and crop assignments into the queryable layout
//! views collaborators consume: two shelves of slots for the nursery,
//! four walls of slots for cultivation, each with an overflow bucket and
//! a utilization percentage.
//!
//! Overflow is a state, never an error: a unit with no placement, or a
//! placement in the other zone, simply appears in the overflow bucket of
//! the zone being projected.
//!
//! The projector is pure — it takes a list of `(UnitId, UnitState)` pairs
//! and produces a layout. The same algorithm serves live state and
//! point-in-time state reconstructed from snapshots; the caller decides
//! which states to feed it.

pub mod projector;
pub mod views;

pub use projector::{project_cultivation, project_nursery};
pub use views::{
    CropCatalog, CropComposition, CropDetail, CropView, CultivationLayout, NullCropCatalog,
    NurseryLayout, SlotView, UnitView, WallView,
};
