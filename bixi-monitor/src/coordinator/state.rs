//! Published refresh state and the read-side handle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::inventory::ErrorKind;
use crate::station::{StationRecord, StationSnapshot};

/// What the coordinator is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Refreshing,
}

/// A refresh cycle that did not publish a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[error("update failed ({kind}): {message}")]
pub struct UpdateFailed {
    /// Classification of the underlying failure
    pub kind: ErrorKind,
    /// Human-readable cause
    pub message: String,
    /// When the cycle gave up
    pub at: DateTime<Utc>,
}

impl UpdateFailed {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

/// Everything readers can observe about the coordinator.
///
/// Each published value is complete; a refresh builds a new `RefreshState`
/// and swaps it in.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshState {
    /// Last successfully fetched snapshot; failed cycles keep it.
    pub snapshot: Arc<StationSnapshot>,
    /// Most recent failure, cleared by the next success.
    pub last_error: Option<UpdateFailed>,
    /// When the snapshot was fetched.
    pub last_success: Option<DateTime<Utc>>,
    pub phase: Phase,
}

impl RefreshState {
    /// State before any refresh: empty snapshot, no history.
    pub fn initial() -> Self {
        Self {
            snapshot: Arc::new(StationSnapshot::empty()),
            last_error: None,
            last_success: None,
            phase: Phase::Idle,
        }
    }

    pub(super) fn with_phase(&self, phase: Phase) -> Self {
        Self {
            phase,
            ..self.clone()
        }
    }

    pub(super) fn succeeded(snapshot: StationSnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            last_error: None,
            last_success: Some(Utc::now()),
            phase: Phase::Idle,
        }
    }

    pub(super) fn failed(&self, error: UpdateFailed) -> Self {
        Self {
            snapshot: Arc::clone(&self.snapshot),
            last_error: Some(error),
            last_success: self.last_success,
            phase: Phase::Idle,
        }
    }
}

/// Cloneable read handle onto a coordinator's published state.
///
/// Reads never wait for a refresh in flight; they see the last published
/// state.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<Arc<RefreshState>>,
}

impl SnapshotReader {
    pub(super) fn new(rx: watch::Receiver<Arc<RefreshState>>) -> Self {
        Self { rx }
    }

    /// The full current state.
    pub fn state(&self) -> Arc<RefreshState> {
        Arc::clone(&self.rx.borrow())
    }

    /// The last good snapshot.
    pub fn snapshot(&self) -> Arc<StationSnapshot> {
        Arc::clone(&self.rx.borrow().snapshot)
    }

    /// One station from the last good snapshot.
    ///
    /// `None` means the value is unknown: the station was not found upstream
    /// or no refresh has succeeded yet.
    pub fn station(&self, name: &str) -> Option<StationRecord> {
        self.rx.borrow().snapshot.get(name).cloned()
    }

    pub fn last_error(&self) -> Option<UpdateFailed> {
        self.rx.borrow().last_error.clone()
    }

    /// Wait until a new state is published.
    ///
    /// Returns `false` once the coordinator has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
