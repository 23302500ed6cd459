//! Station domain types.
//!
//! A station is identified by its human-readable name, exactly as the
//! inventory spells it. The short token from [`resolve`] is only used to
//! build identifiers for downstream consumers.

mod record;
mod uid;

pub use record::{StationRecord, StationSnapshot};
pub use uid::resolve;
