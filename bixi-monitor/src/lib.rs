//! BIXI station monitor.
//!
//! Polls the bike-share map inventory on a fixed interval and keeps the
//! latest dock, bike and e-bike counts for a configured set of stations,
//! exposed as per-station sensors and over HTTP.

pub mod config;
pub mod coordinator;
pub mod inventory;
pub mod logging;
pub mod sensor;
pub mod station;
pub mod web;
