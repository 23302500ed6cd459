//! Map-inventory response DTOs.
//!
//! These types follow the GeoJSON-ish document served by the inventory
//! endpoint. Every nested field is optional: the feed mixes station
//! features with other map features, and a field with an unexpected type is
//! read as absent instead of failing the whole document.

use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use serde_json::Value;

/// A parsed inventory document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInventory {
    /// Every element of the top-level `features` array.
    pub features: Vec<RawFeature>,
}

impl RawInventory {
    /// Parse an inventory body.
    ///
    /// Fails only if the body is not JSON at all. A document without a
    /// `features` array yields an empty inventory.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let document: Value = serde_json::from_str(body)?;
        Ok(Self::from_value(&document))
    }

    /// Read an already-decoded document.
    pub fn from_value(document: &Value) -> Self {
        let features = match document.get("features") {
            Some(Value::Array(items)) => items.iter().map(RawFeature::from_value).collect(),
            _ => Vec::new(),
        };
        Self { features }
    }

    /// Features carrying a station object with a name, in document order.
    pub fn named_stations(&self) -> impl Iterator<Item = (&str, &RawStation)> {
        self.features
            .iter()
            .filter_map(RawFeature::station)
            .filter_map(|station| station.name.as_deref().map(|name| (name, station)))
    }
}

/// One element of `features`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct RawFeature {
    #[serde(default, deserialize_with = "lenient")]
    pub properties: Option<RawProperties>,
}

impl RawFeature {
    /// Read a feature, treating anything that is not an object as empty.
    pub fn from_value(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }

    /// The nested `properties.station` object, if present.
    pub fn station(&self) -> Option<&RawStation> {
        self.properties.as_ref()?.station.as_ref()
    }
}

/// The `properties` object of a feature.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct RawProperties {
    /// Only bike-share stations carry this; other map features don't.
    #[serde(default, deserialize_with = "lenient")]
    pub station: Option<RawStation>,
}

/// Station fields as reported upstream.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct RawStation {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub docks_available: Option<u32>,

    #[serde(default, deserialize_with = "lenient")]
    pub bikes_available: Option<u32>,

    #[serde(default, deserialize_with = "lenient")]
    pub ebikes_available: Option<u32>,
}

/// Deserialize a field, mapping a wrong type (or `null`) to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}
