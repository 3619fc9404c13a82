//! SQLite-backed user state storage.
//!
//! The aggregate is stored as one JSON document in a single-row table, so
//! every save replaces it atomically.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::migrations;
use super::state_store::StateStore;
use super::Config;
use crate::error::{DatabaseError, Result};
use crate::state::UserState;

const STATE_ROW_ID: i64 = 0;

/// SQLite database holding the user state document.
pub struct SqliteStateStore {
    conn: Mutex<Connection>,
}

impl SqliteStateStore {
    /// Open the database named in `config` inside the data directory.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_at(&config.database_path()?)
    }

    /// Open the database at `path`, creating the file and schema if needed.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateStore for SqliteStateStore {
    fn load(&self) -> Result<Option<UserState>> {
        let document: Option<String> = self
            .conn()
            .query_row(
                "SELECT document FROM user_state WHERE id = ?1",
                params![STATE_ROW_ID],
                |row| row.get(0),
            )
            .optional()?;

        match document {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &UserState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO user_state (id, document, updated_at) VALUES (?1, ?2, ?3)",
            params![STATE_ROW_ID, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn reset(&self) -> Result<usize> {
        let removed = self.conn().execute("DELETE FROM user_state", [])?;
        Ok(removed)
    }
}

impl std::fmt::Debug for SqliteStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStateStore").finish_non_exhaustive()
    }
}
