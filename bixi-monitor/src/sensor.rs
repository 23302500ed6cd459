//! Per-station sensors: named values read out of the current snapshot.
//!
//! Each monitored station exposes four sensors keyed by the station's
//! resolved token (`{uid}_name`, `{uid}_docks`, `{uid}_bikes`,
//! `{uid}_e-bikes`). A station missing from the snapshot reads as
//! [`SensorValue::Unknown`].

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::station::{StationRecord, StationSnapshot, resolve};

/// Which field of a station a sensor reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Name,
    Docks,
    Bikes,
    Ebikes,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Name, Metric::Docks, Metric::Bikes, Metric::Ebikes];

    /// Suffix appended to the station token to form the sensor key.
    pub fn key_suffix(self) -> &'static str {
        match self {
            Metric::Name => "name",
            Metric::Docks => "docks",
            Metric::Bikes => "bikes",
            Metric::Ebikes => "e-bikes",
        }
    }

    /// Display label; sensor names put the station token in front of it.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Name => "Station Name",
            Metric::Docks => "Available docks",
            Metric::Bikes => "Bikes",
            Metric::Ebikes => "E-bikes",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Metric::Name => "mdi:tag",
            Metric::Docks => "mdi:locker",
            Metric::Bikes => "mdi:bicycle",
            Metric::Ebikes => "mdi:bicycle-electric",
        }
    }

    /// Counts are measurements; the name is not.
    pub fn is_measurement(self) -> bool {
        !matches!(self, Metric::Name)
    }

    fn read(self, record: &StationRecord) -> SensorValue {
        match self {
            Metric::Name => SensorValue::Text(record.name().to_string()),
            Metric::Docks => SensorValue::Count(record.docks_available()),
            Metric::Bikes => SensorValue::Count(record.bikes_available()),
            Metric::Ebikes => SensorValue::Count(record.ebikes_available()),
        }
    }
}

/// Current value of a sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorValue {
    Text(String),
    Count(u32),
    /// The station is not in the snapshot (not found upstream, or no
    /// refresh has succeeded yet).
    Unknown,
}

/// Serialized as the bare value; `Unknown` becomes `"unknown"`.
impl Serialize for SensorValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SensorValue::Text(text) => serializer.serialize_str(text),
            SensorValue::Count(count) => serializer.serialize_u32(*count),
            SensorValue::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

/// One sensor of one monitored station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorDescription {
    /// Unique key, e.g. `mtro_debr_bikes`
    pub key: String,
    /// e.g. `mtro_debr Bikes`
    pub name: String,
    pub icon: &'static str,
    pub metric: Metric,
    /// Station name as requested (and as keyed in the snapshot)
    pub station: String,
}

impl SensorDescription {
    /// Read this sensor from a snapshot.
    pub fn value(&self, snapshot: &StationSnapshot) -> SensorValue {
        snapshot
            .get(&self.station)
            .map_or(SensorValue::Unknown, |record| self.metric.read(record))
    }
}

/// Sensors for one station, keyed by `uid`.
fn station_sensors(station: &str, uid: &str) -> impl Iterator<Item = SensorDescription> {
    Metric::ALL.into_iter().map(move |metric| SensorDescription {
        key: format!("{uid}_{}", metric.key_suffix()),
        name: format!("{uid} {}", metric.label()),
        icon: metric.icon(),
        metric,
        station: station.to_string(),
    })
}

/// Build the sensors for every requested station, in request order.
///
/// Stations whose tokens collide get `_2`, `_3`, … appended to the token,
/// in the order given, so every key stays unique. Duplicate station names
/// are listed once.
pub fn sensors_for_stations<I, T>(stations: I) -> Vec<SensorDescription>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut seen_stations = std::collections::HashSet::new();
    let mut token_uses: HashMap<String, usize> = HashMap::new();
    let mut sensors = Vec::new();

    for station in stations {
        let station = station.as_ref();
        if !seen_stations.insert(station.to_string()) {
            continue;
        }

        let token = resolve(station);
        let uses = token_uses.entry(token.clone()).or_insert(0);
        *uses += 1;
        let uid = if *uses == 1 {
            token
        } else {
            let uid = format!("{token}_{uses}");
            warn!(station, token = %token, uid = %uid, "station token collision, disambiguating");
            uid
        };

        sensors.extend(station_sensors(station, &uid));
    }
    sensors
}
