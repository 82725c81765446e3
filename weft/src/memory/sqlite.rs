//! Shared connection setup for the SQLite checkpointer and store.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

/// How long a connection waits on a lock held by another connection or process.
pub(crate) const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens `path` with [`BUSY_TIMEOUT`] so concurrent writers wait instead of failing with `SQLITE_BUSY`.
pub(crate) fn open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}
