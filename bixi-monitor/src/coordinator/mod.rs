//! Scheduled refresh of the requested stations.
//!
//! The coordinator fetches the inventory once at start (awaited), then on a
//! fixed interval in a background task. Each successful cycle swaps in a
//! complete new snapshot; a failed cycle keeps the last good one and records
//! an [`UpdateFailed`] for whoever supervises the coordinator.

mod refresh;
mod state;

pub use refresh::{RefreshCoordinator, RefreshOutcome};
pub use state::{Phase, RefreshState, SnapshotReader, UpdateFailed};
