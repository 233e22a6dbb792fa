//! # canopy-workflow — Provisioning Workflow and Service Facade
//!
//! Orchestrates unit creation, placement, movement, and retirement,
//! enforcing every allocation invariant inside the per-container critical
//! section. The [`AllocationService`] is the surface collaborators call;
//! nothing outside this crate mutates allocation state.
//!
//! ## Lifecycle
//!
//! ```text
//! Provisioned ──▶ InUse ──▶ InUse (move)
//!      │            │ ▲
//!      │            ▼ │
//!      └────────▶ Storage
//!
//! any non-terminal ──▶ Retired (terminal)
//! ```
//!
//! Retirement always succeeds from a non-terminal status: it vacates the
//! slot, force-unassigns the unit's crops, and keeps the unit record and
//! all snapshots. No transition leaves `Retired`.
//!
//! ## Snapshot discipline
//!
//! Every successful mutation appends a snapshot of the unit's new state —
//! after the container lock is released. Snapshot writes are
//! fire-and-forget appends; no invariant spans the container lock and the
//! snapshot store.

pub mod fixtures;
pub mod lifecycle;
pub mod service;

pub use fixtures::{
    load_fixtures, load_fixtures_from_env, load_fixtures_from_path, ContainerFixture,
    CropFixture, FixtureDocument, FixtureError, FixtureReport, UnitFixture, FIXTURES_ENV_VAR,
};
pub use service::{
    AllocationService, AuthContext, ProvisionOutcome, ProvisionRequest, RetireOutcome,
    SlotListing,
};
