//! Bike-share map inventory: fetching, lenient parsing, and station selection.
//!
//! The inventory endpoint returns every station in the network on each call;
//! there is no per-station query. A refresh therefore downloads the whole
//! document and keeps only the requested stations.

mod client;
mod error;
mod file;
mod select;
mod types;

use std::future::Future;
use std::sync::Arc;

pub use client::{DEFAULT_FETCH_TIMEOUT, DEFAULT_INVENTORY_URL, InventoryClient, InventoryConfig};
pub use error::{ErrorKind, FetchError};
pub use file::FileInventory;
pub use select::select_and_map;
pub use types::{RawFeature, RawInventory, RawProperties, RawStation};

/// Something that can produce the current raw inventory.
///
/// This abstraction allows the refresh coordinator to be tested with
/// scripted responses and run against a local file.
pub trait InventorySource: Send + Sync + 'static {
    /// Fetch the full inventory once.
    fn fetch_inventory(&self) -> impl Future<Output = Result<RawInventory, FetchError>> + Send;
}

impl<T: InventorySource> InventorySource for Arc<T> {
    fn fetch_inventory(&self) -> impl Future<Output = Result<RawInventory, FetchError>> + Send {
        (**self).fetch_inventory()
    }
}
