//! Persisted first-launch flag.
//!
//! # Invariants
//! - The flag starts unset and is set at most once; nothing resets it.
//! - Marking is idempotent.
//! - The flag lives in the same database as the items it gates.

use crate::db::DbHandle;
use crate::repo::todo_repo::RepoResult;
use log::info;
use rusqlite::{Connection, OptionalExtension};

const SEED_COMPLETED_KEY: &str = "seed_completed";

/// Gate deciding whether the one-time remote seed still has to run.
pub trait LaunchFlag: Send + Sync {
    /// Returns `true` until [`LaunchFlag::mark_seed_completed`] has succeeded.
    fn is_first_launch(&self) -> RepoResult<bool>;
    /// Permanently records that the seed finished.
    fn mark_seed_completed(&self) -> RepoResult<()>;
}

/// SQLite-backed launch flag stored in `app_flags`.
#[derive(Clone)]
pub struct SqliteLaunchFlag {
    db: DbHandle,
}

impl SqliteLaunchFlag {
    pub fn new(db: DbHandle) -> Self {
        Self { db }
    }
}

impl LaunchFlag for SqliteLaunchFlag {
    fn is_first_launch(&self) -> RepoResult<bool> {
        let value = self.db.with_conn(|conn| -> RepoResult<Option<bool>> {
            Ok(conn
                .query_row(
                    "SELECT value FROM app_flags WHERE key = ?1;",
                    [SEED_COMPLETED_KEY],
                    |row| row.get::<_, bool>(0),
                )
                .optional()?)
        })?;
        Ok(!value.unwrap_or(false))
    }

    fn mark_seed_completed(&self) -> RepoResult<()> {
        self.db.with_conn(|conn| -> RepoResult<()> {
            set_seed_completed(conn)?;
            Ok(())
        })?;
        info!("event=seed_flag_set module=repo status=ok");
        Ok(())
    }
}

/// Upserts the seed-completed row on `conn`, inside the caller's transaction
/// when one is open.
pub(crate) fn set_seed_completed(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO app_flags (key, value) VALUES (?1, 1)
         ON CONFLICT (key) DO UPDATE SET value = 1;",
        [SEED_COMPLETED_KEY],
    )?;
    Ok(())
}
