//! Map-inventory HTTP client.

use std::time::Duration;

use tracing::{debug, info};

use super::InventorySource;
use super::error::FetchError;
use super::types::RawInventory;

/// Montréal map inventory: every station with its live counts.
pub const DEFAULT_INVENTORY_URL: &str = "https://layer.bicyclesharing.net/map/v1/mtl/map-inventory";

/// Default bound on connecting to and reading from the inventory API.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the inventory client.
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Inventory endpoint
    pub url: String,
    /// Bound on the whole request, connection included
    pub timeout: Duration,
}

impl InventoryConfig {
    /// Create a config for the default endpoint and timeout.
    pub fn new() -> Self {
        Self {
            url: DEFAULT_INVENTORY_URL.to_string(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Set a custom endpoint (for testing).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the bike-share map inventory.
#[derive(Debug, Clone)]
pub struct InventoryClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl InventoryClient {
    /// Create a new inventory client.
    pub fn new(config: InventoryConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Connection {
                message: format!("cannot build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            url: config.url,
            timeout: config.timeout,
        })
    }

    /// The endpoint this client polls.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and parse the whole inventory.
    pub async fn fetch_inventory(&self) -> Result<RawInventory, FetchError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout))?;

        let inventory = RawInventory::from_json(&body).map_err(|e| FetchError::Body {
            message: e.to_string(),
        })?;

        debug!(features = inventory.features.len(), "fetched inventory");
        Ok(inventory)
    }

    /// List every named station in the inventory, in upstream order.
    ///
    /// Used to pick the stations to monitor.
    pub async fn fetch_station_names(&self) -> Result<Vec<String>, FetchError> {
        let inventory = self.fetch_inventory().await?;
        let names = station_names(&inventory);

        info!(
            "{} valid stations on {} features",
            names.len(),
            inventory.features.len()
        );
        Ok(names)
    }
}

impl InventorySource for InventoryClient {
    async fn fetch_inventory(&self) -> Result<RawInventory, FetchError> {
        InventoryClient::fetch_inventory(self).await
    }
}

/// Names of all features that carry a named station object.
fn station_names(inventory: &RawInventory) -> Vec<String> {
    inventory
        .named_stations()
        .map(|(name, _)| name.to_string())
        .collect()
}
