//! `SQLite`-backed sail log: one row per configuration change.

use std::fs;
use std::path::{Path, PathBuf};

use jiff::Timestamp;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::model::{LogEntry, Selection};

use super::{OnCollision, Result, SailLog, StoreError};

/// `SQLite` implementation of the sail log.
pub struct SqliteLog {
    conn: Connection,
    vessel: String,
    on_collision: OnCollision,
}

impl SqliteLog {
    /// Opens (creating if needed) the log database at the given path,
    /// scoped to one vessel's records.
    pub fn open(
        path: impl AsRef<Path>,
        vessel: impl Into<String>,
        on_collision: OnCollision,
    ) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS sail_config (
                 vessel   TEXT NOT NULL,
                 ts       TEXT NOT NULL,
                 main     TEXT NOT NULL,
                 headsail TEXT,
                 downwind TEXT,
                 staysail INTEGER NOT NULL,
                 comment  TEXT NOT NULL,
                 PRIMARY KEY (vessel, ts)
             )",
            [],
        )?;
        Ok(Self {
            conn,
            vessel: vessel.into(),
            on_collision,
        })
    }

    /// The default database path: `~/.sailplan/log.sqlite`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".sailplan").join("log.sqlite"))
    }
}

impl SailLog for SqliteLog {
    fn fetch_latest(&self) -> Result<Option<LogEntry>> {
        let row = self
            .conn
            .query_row(
                "SELECT ts, main, headsail, downwind, staysail, comment
                 FROM sail_config WHERE vessel = ?1
                 ORDER BY ts DESC LIMIT 1",
                [&self.vessel],
                raw_entry,
            )
            .optional()?;
        row.map(entry_from_raw).transpose()
    }

    fn fetch_history(&self, since: Timestamp, limit: usize) -> Result<Vec<LogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT ts, main, headsail, downwind, staysail, comment
             FROM sail_config WHERE vessel = ?1 AND ts >= ?2
             ORDER BY ts DESC LIMIT ?3",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(
            rusqlite::params![&self.vessel, ts_key(since), limit],
            raw_entry,
        )?;
        let mut entries = Vec::new();
        for raw in rows {
            entries.push(entry_from_raw(raw?)?);
        }
        Ok(entries)
    }

    fn write(&self, entry: &LogEntry) -> Result<()> {
        let sql = match self.on_collision {
            OnCollision::Reject => {
                "INSERT INTO sail_config (vessel, ts, main, headsail, downwind, staysail, comment)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
            }
            OnCollision::Overwrite => {
                "INSERT OR REPLACE INTO sail_config
                     (vessel, ts, main, headsail, downwind, staysail, comment)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
            }
        };
        let result = self.conn.execute(
            sql,
            rusqlite::params![
                &self.vessel,
                ts_key(entry.timestamp),
                &entry.selection.main,
                &entry.selection.headsail,
                &entry.selection.downwind,
                entry.selection.staysail,
                &entry.selection.comment,
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateTimestamp(entry.timestamp))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, timestamp: Timestamp) -> Result<()> {
        let rows = self.conn.execute(
            "DELETE FROM sail_config WHERE vessel = ?1 AND ts = ?2",
            rusqlite::params![&self.vessel, ts_key(timestamp)],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound(timestamp));
        }
        Ok(())
    }
}

/// Formats a timestamp as the store key: RFC 3339 UTC at second precision.
/// Fixed width, so lexicographic order is chronological order.
fn ts_key(ts: Timestamp) -> String {
    ts.strftime("%Y-%m-%dT%H:%M:%SZ").to_string()
}

type RawEntry = (String, String, Option<String>, Option<String>, bool, String);

/// Reads one row's columns without interpretation.
fn raw_entry(row: &Row) -> rusqlite::Result<RawEntry> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

/// Parses raw columns into a [`LogEntry`].
fn entry_from_raw(raw: RawEntry) -> Result<LogEntry> {
    let (ts_str, main, headsail, downwind, staysail, comment) = raw;
    let timestamp = ts_str
        .parse::<Timestamp>()
        .map_err(|e| StoreError::Corrupt(format!("invalid timestamp '{ts_str}': {e}")))?;
    Ok(LogEntry {
        selection: Selection {
            main,
            headsail,
            downwind,
            staysail,
            comment,
        },
        timestamp,
    })
}
