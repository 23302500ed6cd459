//! Monitor configuration, loaded from TOML.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inventory::{DEFAULT_INVENTORY_URL, InventoryConfig};

/// Shortest allowed refresh interval (minutes).
pub const MIN_SCAN_INTERVAL_MINS: u64 = 5;
/// Longest allowed refresh interval (minutes).
pub const MAX_SCAN_INTERVAL_MINS: u64 = 60;

/// Errors from loading or validating a [`MonitorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("no stations configured")]
    NoStations,

    #[error("scan interval must be between {min} and {max} minutes, got {value}")]
    InvalidScanInterval { value: u64, min: u64, max: u64 },

    #[error("fetch timeout must be at least one second")]
    InvalidFetchTimeout,

    #[error("invalid listen address {0:?}")]
    InvalidListen(String),
}

/// Everything the monitor needs to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Station names to monitor, exactly as the inventory spells them.
    #[serde(default)]
    pub stations: Vec<String>,

    /// Minutes between scheduled refreshes.
    #[serde(default = "default_scan_interval_mins")]
    pub scan_interval_mins: u64,

    #[serde(default = "default_inventory_url")]
    pub inventory_url: String,

    /// Upper bound on one fetch, in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Address for the HTTP read surface.
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_scan_interval_mins() -> u64 {
    MIN_SCAN_INTERVAL_MINS
}

fn default_inventory_url() -> String {
    DEFAULT_INVENTORY_URL.to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_listen() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            stations: Vec::new(),
            scan_interval_mins: default_scan_interval_mins(),
            inventory_url: default_inventory_url(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            listen: default_listen(),
            log_level: default_log_level(),
        }
    }
}

impl MonitorConfig {
    /// Load from a TOML file. The result is not validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn with_stations<I, T>(mut self, stations: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.stations = stations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scan_interval_mins(mut self, mins: u64) -> Self {
        self.scan_interval_mins = mins;
        self
    }

    pub fn with_inventory_url(mut self, url: impl Into<String>) -> Self {
        self.inventory_url = url.into();
        self
    }

    pub fn with_fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = secs;
        self
    }

    pub fn with_listen(mut self, listen: impl Into<String>) -> Self {
        self.listen = listen.into();
        self
    }

    /// Check the configuration before anything is started.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stations.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::NoStations);
        }
        if !(MIN_SCAN_INTERVAL_MINS..=MAX_SCAN_INTERVAL_MINS).contains(&self.scan_interval_mins) {
            return Err(ConfigError::InvalidScanInterval {
                value: self.scan_interval_mins,
                min: MIN_SCAN_INTERVAL_MINS,
                max: MAX_SCAN_INTERVAL_MINS,
            });
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidFetchTimeout);
        }
        self.listen_addr()?;
        Ok(())
    }

    /// The requested stations with blanks dropped and duplicates collapsed.
    pub fn station_set(&self) -> HashSet<String> {
        self.stations
            .iter()
            .filter(|s| !s.trim().is_empty())
            .cloned()
            .collect()
    }

    /// The requested stations in configured order, duplicates dropped.
    pub fn station_list(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.stations
            .iter()
            .filter(|s| !s.trim().is_empty() && seen.insert(s.as_str()))
            .cloned()
            .collect()
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_mins.saturating_mul(60))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen
            .parse()
            .map_err(|_| ConfigError::InvalidListen(self.listen.clone()))
    }

    /// Settings for the HTTP inventory client.
    pub fn inventory(&self) -> InventoryConfig {
        InventoryConfig::new()
            .with_url(&self.inventory_url)
            .with_timeout(self.fetch_timeout())
    }
}
