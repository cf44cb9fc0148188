//! Synchronization controller: update lease, debounced pending queue, and
//! the operations that rewrite derived fields

mod controller;
mod lease;
mod pending;

pub use controller::{
    CreatedSubtopic, DEFAULT_DEBOUNCE, SkipReason, SyncController, SyncError, SyncReport,
    SyncSettings, ToggleOutcome, UpdateOutcome,
};
pub use lease::{UpdateGate, UpdateLease};
pub use pending::PendingQueue;
