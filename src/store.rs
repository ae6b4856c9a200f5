//! Time-series persistence for sail configuration changes.
//!
//! One record per change, keyed by `(vessel, timestamp)`. The store is the
//! only resource shared between clients; it is authoritative for
//! "most recent write wins" — the reconciler never merges across clients.

mod sqlite;

use jiff::Timestamp;
use serde::Deserialize;

use crate::model::LogEntry;

pub use sqlite::SqliteLog;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record already exists at this timestamp and the store is
    /// configured to reject collisions.
    #[error("a record already exists at {0}")]
    DuplicateTimestamp(Timestamp),

    /// No record exists at this timestamp.
    #[error("no record at {0}")]
    NotFound(Timestamp),

    /// A stored row could not be read back as a valid record.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// `SQLite` error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Store result type.
pub type Result<T> = core::result::Result<T, StoreError>;

/// How a write that lands on an existing timestamp is handled.
///
/// Backdated entries make collisions possible in normal use, so the policy
/// is boat configuration rather than a hardcoded choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnCollision {
    /// Refuse the write and surface [`StoreError::DuplicateTimestamp`].
    #[default]
    Reject,
    /// Replace the existing record.
    Overwrite,
}

/// Store access contract consumed by the interaction loop.
///
/// Implementations are synchronous; the reconciler's logic runs before and
/// after these calls, never interleaved with them.
pub trait SailLog {
    /// The most recent record for the vessel, or `None` on a fresh log.
    fn fetch_latest(&self) -> Result<Option<LogEntry>>;

    /// Records at or after `since`, most recent first, at most `limit`.
    fn fetch_history(&self, since: Timestamp, limit: usize) -> Result<Vec<LogEntry>>;

    /// Persists one configuration change.
    fn write(&self, entry: &LogEntry) -> Result<()>;

    /// Deletes the record at exactly `timestamp`.
    fn delete(&self, timestamp: Timestamp) -> Result<()>;
}
