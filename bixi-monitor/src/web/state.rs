//! Application state for the web layer.

use std::sync::Arc;

use crate::coordinator::SnapshotReader;
use crate::sensor::SensorDescription;

/// Shared application state.
///
/// Handlers only read; the refresh coordinator owns all writes.
#[derive(Clone)]
pub struct AppState {
    /// Read handle onto the coordinator's published state
    pub reader: SnapshotReader,

    /// Sensors for the monitored stations
    pub sensors: Arc<Vec<SensorDescription>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(reader: SnapshotReader, sensors: Vec<SensorDescription>) -> Self {
        Self {
            reader,
            sensors: Arc::new(sensors),
        }
    }
}
