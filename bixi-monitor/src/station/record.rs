//! Station availability records and per-cycle snapshots.

use std::collections::HashMap;
use std::collections::hash_map;

use serde::Serialize;

/// Live availability at one station.
///
/// Counts are never missing: the upstream omitting a field means zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StationRecord {
    name: String,
    docks_available: u32,
    bikes_available: u32,
    ebikes_available: u32,
}

impl StationRecord {
    /// Create a record from already-defaulted counts.
    pub fn new(
        name: impl Into<String>,
        docks_available: u32,
        bikes_available: u32,
        ebikes_available: u32,
    ) -> Self {
        Self {
            name: name.into(),
            docks_available,
            bikes_available,
            ebikes_available,
        }
    }

    /// Station name exactly as reported upstream.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn docks_available(&self) -> u32 {
        self.docks_available
    }

    pub fn bikes_available(&self) -> u32 {
        self.bikes_available
    }

    pub fn ebikes_available(&self) -> u32 {
        self.ebikes_available
    }
}

/// Requested stations found in one inventory, keyed by name.
///
/// Built in full by one refresh cycle and never modified afterwards;
/// the coordinator swaps whole snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StationSnapshot {
    stations: HashMap<String, StationRecord>,
}

impl StationSnapshot {
    /// An empty snapshot, as held before the first successful refresh.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up a station by its exact (case-sensitive) name.
    pub fn get(&self, name: &str) -> Option<&StationRecord> {
        self.stations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Iterate over records in no particular order.
    pub fn records(&self) -> hash_map::Values<'_, String, StationRecord> {
        self.stations.values()
    }

    /// Station names in no particular order.
    pub fn names(&self) -> hash_map::Keys<'_, String, StationRecord> {
        self.stations.keys()
    }
}

/// Later records replace earlier ones with the same name.
impl FromIterator<StationRecord> for StationSnapshot {
    fn from_iter<I: IntoIterator<Item = StationRecord>>(iter: I) -> Self {
        let stations = iter
            .into_iter()
            .map(|record| (record.name.clone(), record))
            .collect();
        Self { stations }
    }
}
