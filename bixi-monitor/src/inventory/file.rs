//! File-backed inventory for running without network access.
//!
//! Reads a saved map-inventory document from disk on every fetch, so the
//! file can be edited while the monitor runs.

use std::path::{Path, PathBuf};

use super::InventorySource;
use super::error::FetchError;
use super::types::RawInventory;

/// Inventory source that serves a JSON file as if it were the live API.
#[derive(Debug, Clone)]
pub struct FileInventory {
    path: PathBuf,
}

impl FileInventory {
    /// Create a source reading `path`. The file is not touched until the
    /// first fetch.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file.
    pub async fn read(&self) -> Result<RawInventory, FetchError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FetchError::File {
                message: format!("{}: {e}", self.path.display()),
            })?;

        RawInventory::from_json(&body).map_err(|e| FetchError::Body {
            message: format!("{}: {e}", self.path.display()),
        })
    }
}

impl InventorySource for FileInventory {
    async fn fetch_inventory(&self) -> Result<RawInventory, FetchError> {
        self.read().await
    }
}
