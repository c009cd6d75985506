//! Durable local session storage
//!
//! Two identifiers survive restarts: the chat session id, stored under a
//! fixed key, and the session's active case, stored under a key derived
//! from the session id. Conversation text is never persisted.
//!
//! [`SessionStore`] implementations only provide string get/set/remove;
//! the key layout lives in the provided methods so every backend agrees
//! on it.

use crate::error::{EcomdeskError, Result};
use anyhow::Context;
use chrono::Utc;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

pub mod memory;
pub use memory::MemorySessionStore;

/// Key holding the current session id
pub const SESSION_KEY: &str = "ecomdesk.session_id";

/// Key holding the active case id for `session_id`
pub fn active_case_key(session_id: &str) -> String {
    format!("ecomdesk.active_case:{}", session_id)
}

/// Persistent storage for the session id and active-case pointer
pub trait SessionStore: Send + Sync {
    /// Read a raw value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a raw value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a raw value; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// Load the persisted session id
    fn load(&self) -> Result<Option<String>> {
        self.get(SESSION_KEY)
    }

    /// Persist the session id
    fn save(&self, session_id: &str) -> Result<()> {
        self.set(SESSION_KEY, session_id)
    }

    /// Forget the session id
    fn clear(&self) -> Result<()> {
        self.remove(SESSION_KEY)
    }

    /// Load the active case id recorded for `session_id`
    fn load_active_case(&self, session_id: &str) -> Result<Option<String>> {
        self.get(&active_case_key(session_id))
    }

    /// Record `case_id` as the active case of `session_id`
    fn save_active_case(&self, session_id: &str, case_id: &str) -> Result<()> {
        self.set(&active_case_key(session_id), case_id)
    }

    /// Drop the active case pointer of `session_id`
    fn clear_active_case(&self, session_id: &str) -> Result<()> {
        self.remove(&active_case_key(session_id))
    }
}

/// SQLite-backed [`SessionStore`]
///
/// Values live in a single key/value table. A connection is opened per
/// operation, so the store is cheap to share across tasks.
#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    db_path: PathBuf,
}

impl SqliteSessionStore {
    /// Create a store in the user's data directory
    ///
    /// Honors `ECOMDESK_SESSION_DB` when set.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("ECOMDESK_SESSION_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "ecomdesk", "ecomdesk")
            .ok_or_else(|| EcomdeskError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join("session.db"))
    }

    /// Create a store backed by the database at `db_path`
    ///
    /// # Examples
    ///
    /// ```
    /// use ecomdesk::storage::{SessionStore, SqliteSessionStore};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SqliteSessionStore::new_with_path(dir.path().join("session.db")).unwrap();
    /// store.save("s-1").unwrap();
    /// assert_eq!(store.load().unwrap().as_deref(), Some("s-1"));
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| EcomdeskError::Storage(e.to_string()))?;
        }

        let store = Self { db_path };
        store.init()?;
        Ok(store)
    }

    /// Open the store described by an optional configured path
    pub fn open(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::new_with_path(path),
            None => Self::new(),
        }
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| EcomdeskError::Storage(e.to_string()).into())
    }

    fn init(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| EcomdeskError::Storage(e.to_string()))?;
        Ok(())
    }
}

impl SessionStore for SqliteSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query local storage")
            .map_err(|e| EcomdeskError::Storage(e.to_string()))?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )
        .context("Failed to write local storage")
        .map_err(|e| EcomdeskError::Storage(e.to_string()))?;
        tracing::debug!("stored {}", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM local_storage WHERE key = ?", params![key])
            .context("Failed to delete from local storage")
            .map_err(|e| EcomdeskError::Storage(e.to_string()))?;
        tracing::debug!("removed {}", key);
        Ok(())
    }
}
