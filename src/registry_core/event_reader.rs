//! Read-only SQLite reader for captured transaction events
//!
//! Streams raw serialized rows out of the `mint_event` table with a single
//! unfiltered full-table scan. Parsing and aggregation happen downstream;
//! this layer only hands out strings.

use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// Read-only handle on the event database
pub struct EventReader {
    conn: Connection,
}

impl EventReader {
    /// Open the event database read-only.
    ///
    /// The whole run only ever reads from this store, so the connection is
    /// opened with `SQLITE_OPEN_READ_ONLY`. A missing database file is an
    /// open-time error rather than a silently created empty database.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        Ok(Self { conn })
    }

    /// Stream every raw event row through `on_row`, one at a time.
    ///
    /// No ordering is assumed or guaranteed; downstream aggregation must be
    /// invariant to row order. Returns the number of rows scanned. Malformed
    /// row content is the callback's problem and never aborts the scan.
    pub fn scan<F>(&self, mut on_row: F) -> Result<u64, rusqlite::Error>
    where
        F: FnMut(&str),
    {
        let mut stmt = self.conn.prepare("SELECT raw_json FROM mint_event")?;
        let mut rows = stmt.query([])?;

        let mut scanned = 0u64;
        while let Some(row) = rows.next()? {
            let raw: String = row.get(0)?;
            on_row(&raw);
            scanned += 1;
        }

        Ok(scanned)
    }
}
