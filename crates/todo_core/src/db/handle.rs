//! Shared, lock-guarded connection handle.
//!
//! Every repository in this crate talks to SQLite through [`DbHandle`]. The
//! mutex is the single-writer queue: a caller holds it for the whole
//! statement sequence, so batch writes and read-then-write steps are never
//! interleaved with other callers.

use super::{open_db, open_db_in_memory, DbError, DbResult};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Cloneable handle to one migrated SQLite connection.
#[derive(Clone)]
pub struct DbHandle {
    conn: Arc<Mutex<Connection>>,
}

impl DbHandle {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        open_db(path).map(Self::new)
    }

    /// Opens (and migrates) a private in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        open_db_in_memory().map(Self::new)
    }

    /// Runs `f` with exclusive access to the connection.
    ///
    /// The lock is held until `f` returns. A poisoned lock is reported as
    /// [`DbError::LockPoisoned`] converted into the caller's error type.
    pub fn with_conn<T, E>(&self, f: impl FnOnce(&mut Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let mut guard = self.conn.lock().map_err(|_| E::from(DbError::LockPoisoned))?;
        f(&mut guard)
    }
}
