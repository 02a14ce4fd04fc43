//! Milestone Sync
//!
//! Optimistic local-state reconciliation for list-valued entity fields
//! (goal milestones). Modules:
//! - item: canonical milestone shape and normalization of raw stored values
//! - checklist: items plus derived progress
//! - reconciler: the sync-once state machine, toggles and revert-on-failure
//! - store: the remote entity store interface and an in-memory implementation
//! - persist: async glue between the two

pub mod checklist;
pub mod error;
pub mod item;
pub mod persist;
pub mod reconciler;
pub mod store;

pub use checklist::{progress_of, Checklist};
pub use error::{ReconcileError, StoreError};
pub use item::{normalize, normalize_field, Milestone, RawMilestone};
pub use persist::{persist, toggle_and_persist};
pub use reconciler::{
    Observation, PendingSave, ReconcilerConfig, Reconciler, RevertPolicy, SettleOutcome, SyncState,
};
pub use store::{EntityId, EntityRecord, EntityStore, MemoryStore};
