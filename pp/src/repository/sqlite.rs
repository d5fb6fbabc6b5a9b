//! SQLite-backed repository

use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use super::{ProgressRepository, parse_document};
use crate::error::RepositoryError;

const UPSERT: &str = "INSERT INTO kv (key, value) VALUES (?1, ?2)
     ON CONFLICT(key) DO UPDATE SET value = excluded.value";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)";

/// Stores documents as JSON text in a single key/value table
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open or create a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| RepositoryError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "Opened SQLite repository");
        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn in_memory() -> Result<Self, RepositoryError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, RepositoryError> {
        conn.execute(SCHEMA, [])?;
        Ok(Self { conn })
    }
}

impl ProgressRepository for SqliteRepository {
    fn get(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        raw.map(|raw| parse_document(key, &raw)).transpose()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), RepositoryError> {
        let raw = value.to_string();
        self.conn.execute(UPSERT, params![key, raw])?;
        debug!(key, "set: upserted document");
        Ok(())
    }

    fn set_many(&mut self, entries: Vec<(&str, Value)>) -> Result<(), RepositoryError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(UPSERT)?;
            for (key, value) in &entries {
                stmt.execute(params![key, value.to_string()])?;
            }
        }
        tx.commit()?;
        debug!(count = entries.len(), "set_many: committed documents");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), RepositoryError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, RepositoryError> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}
