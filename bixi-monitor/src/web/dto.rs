//! Data transfer objects for web responses.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::coordinator::{Phase, RefreshState, UpdateFailed};
use crate::sensor::{SensorDescription, SensorValue};
use crate::station::{StationRecord, StationSnapshot};

/// Coordinator health as seen by readers.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub phase: Phase,

    /// When the current snapshot was fetched
    pub last_success: Option<DateTime<Utc>>,

    /// Most recent failed cycle, if the last cycle failed
    pub last_error: Option<UpdateFailed>,

    /// Stations present in the current snapshot
    pub stations: usize,
}

impl StatusResponse {
    pub fn from_state(state: &RefreshState) -> Self {
        Self {
            phase: state.phase,
            last_success: state.last_success,
            last_error: state.last_error.clone(),
            stations: state.snapshot.len(),
        }
    }
}

/// Every station in the current snapshot, sorted by name.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub last_success: Option<DateTime<Utc>>,
    pub stations: Vec<StationRecord>,
}

impl StationsResponse {
    pub fn from_state(state: &RefreshState) -> Self {
        let mut stations: Vec<StationRecord> = state.snapshot.records().cloned().collect();
        stations.sort_by(|a, b| a.name().cmp(b.name()));
        Self {
            last_success: state.last_success,
            stations,
        }
    }
}

/// One sensor with its current value.
#[derive(Debug, Serialize)]
pub struct SensorReading {
    pub key: String,
    pub name: String,
    pub icon: &'static str,
    pub station: String,
    pub measurement: bool,
    pub value: SensorValue,
}

impl SensorReading {
    pub fn read(sensor: &SensorDescription, snapshot: &StationSnapshot) -> Self {
        Self {
            key: sensor.key.clone(),
            name: sensor.name.clone(),
            icon: sensor.icon,
            station: sensor.station.clone(),
            measurement: sensor.metric.is_measurement(),
            value: sensor.value(snapshot),
        }
    }
}

/// Response for the sensor listing.
#[derive(Debug, Serialize)]
pub struct SensorsResponse {
    pub sensors: Vec<SensorReading>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
