//! A logged configuration change: one selection, one instant.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::Selection;

/// One record in the sail log.
///
/// The timestamp is second precision and is the record's key within the
/// store for a given vessel. Two entries never share a timestamp unless the
/// store is configured to overwrite on collision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// The configuration that took effect.
    #[serde(flatten)]
    pub selection: Selection,

    /// When it took effect (UTC, second precision).
    pub timestamp: Timestamp,
}
