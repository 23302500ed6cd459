//! Selecting requested stations out of a raw inventory.

use std::collections::HashSet;

use crate::station::{StationRecord, StationSnapshot};

use super::types::{RawInventory, RawStation};

/// Build the snapshot of `wanted` stations present in `raw`.
///
/// Requested stations missing upstream are simply not in the result, and
/// features without a named station object are skipped. Never fails.
pub fn select_and_map(raw: &RawInventory, wanted: &HashSet<String>) -> StationSnapshot {
    raw.named_stations()
        .filter(|(name, _)| wanted.contains(*name))
        .map(|(name, station)| to_record(name, station))
        .collect()
}

/// Normalize one upstream station, defaulting missing counts to zero.
fn to_record(name: &str, station: &RawStation) -> StationRecord {
    StationRecord::new(
        name,
        station.docks_available.unwrap_or(0),
        station.bikes_available.unwrap_or(0),
        station.ebikes_available.unwrap_or(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wanted(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn inventory(body: &str) -> RawInventory {
        RawInventory::from_json(body).unwrap()
    }

    #[test]
    fn missing_ebikes_default_to_zero() {
        let raw = inventory(
            r#"{"features":[{"properties":{"station":{"name":"Station A / Station B","docks_available":3,"bikes_available":5}}}]}"#,
        );

        let snapshot = select_and_map(&raw, &wanted(&["Station A / Station B"]));

        assert_eq!(snapshot.len(), 1);
        let record = snapshot.get("Station A / Station B").unwrap();
        assert_eq!(record.docks_available(), 3);
        assert_eq!(record.bikes_available(), 5);
        assert_eq!(record.ebikes_available(), 0);
    }

    #[test]
    fn ghost_station_yields_empty_snapshot() {
        let raw = inventory(
            r#"{"features":[{"properties":{"station":{"name":"Parc Jarry","docks_available":3}}}]}"#,
        );

        let snapshot = select_and_map(&raw, &wanted(&["Ghost Station"]));
        assert!(snapshot.is_empty());
    }

    #[test]
    fn only_requested_and_present_stations() {
        let raw = inventory(
            r#"{"features":[
                {"properties":{"station":{"name":"Parc Jarry","docks_available":1,"bikes_available":2,"ebikes_available":3}}},
                {"properties":{"station":{"name":"Berri / de Maisonneuve","docks_available":4}}},
                {"properties":{"station":{"name":"Métro Laurier / De Brébeuf"}}},
                {"properties":{}},
                {"geometry":{}}
            ]}"#,
        );

        let snapshot = select_and_map(
            &raw,
            &wanted(&["Parc Jarry", "Métro Laurier / De Brébeuf", "Ghost Station"]),
        );

        let mut names: Vec<&String> = snapshot.names().collect();
        names.sort();
        assert_eq!(names, vec!["Métro Laurier / De Brébeuf", "Parc Jarry"]);
        assert!(!snapshot.contains("Ghost Station"));

        let laurier = snapshot.get("Métro Laurier / De Brébeuf").unwrap();
        assert_eq!(laurier.docks_available(), 0);
        assert_eq!(laurier.bikes_available(), 0);
        assert_eq!(laurier.ebikes_available(), 0);
    }

    #[test]
    fn names_match_case_sensitively() {
        let raw = inventory(r#"{"features":[{"properties":{"station":{"name":"Parc Jarry"}}}]}"#);
        assert!(select_and_map(&raw, &wanted(&["parc jarry"])).is_empty());
    }

    #[test]
    fn empty_inventory_or_request() {
        let raw = inventory(r#"{"features":[{"properties":{"station":{"name":"Parc Jarry"}}}]}"#);
        assert!(select_and_map(&raw, &HashSet::new()).is_empty());
        assert!(select_and_map(&RawInventory::default(), &wanted(&["Parc Jarry"])).is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    /// (name, docks, bikes, ebikes) with any count possibly missing.
    fn station() -> impl Strategy<Value = (String, Option<u32>, Option<u32>, Option<u32>)> {
        (
            "[A-E]",
            proptest::option::of(0u32..50),
            proptest::option::of(0u32..50),
            proptest::option::of(0u32..50),
        )
    }

    fn build(stations: &[(String, Option<u32>, Option<u32>, Option<u32>)]) -> RawInventory {
        let features: Vec<_> = stations
            .iter()
            .map(|(name, docks, bikes, ebikes)| {
                json!({"properties": {"station": {
                    "name": name,
                    "docks_available": docks,
                    "bikes_available": bikes,
                    "ebikes_available": ebikes,
                }}})
            })
            .collect();
        RawInventory::from_value(&json!({ "features": features }))
    }

    proptest! {
        #[test]
        fn idempotent(
            stations in proptest::collection::vec(station(), 0..10),
            wanted in proptest::collection::hash_set("[A-G]", 0..7),
        ) {
            let raw = build(&stations);
            prop_assert_eq!(select_and_map(&raw, &wanted), select_and_map(&raw, &wanted));
        }

        #[test]
        fn keys_are_intersection(
            stations in proptest::collection::vec(station(), 0..10),
            wanted in proptest::collection::hash_set("[A-G]", 0..7),
        ) {
            let raw = build(&stations);
            let snapshot = select_and_map(&raw, &wanted);

            let upstream: HashSet<String> = stations.iter().map(|s| s.0.clone()).collect();
            let expected: HashSet<String> = upstream.intersection(&wanted).cloned().collect();
            let actual: HashSet<String> = snapshot.names().cloned().collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn counts_default_to_zero(stations in proptest::collection::vec(station(), 1..10)) {
            let raw = build(&stations);
            let wanted: HashSet<String> = stations.iter().map(|s| s.0.clone()).collect();
            let snapshot = select_and_map(&raw, &wanted);

            // The last feature for a name wins.
            for name in &wanted {
                let (_, docks, bikes, ebikes) = stations.iter().rev().find(|s| &s.0 == name).unwrap();
                let record = snapshot.get(name).unwrap();
                prop_assert_eq!(record.docks_available(), docks.unwrap_or(0));
                prop_assert_eq!(record.bikes_available(), bikes.unwrap_or(0));
                prop_assert_eq!(record.ebikes_available(), ebikes.unwrap_or(0));
            }
        }
    }
}
