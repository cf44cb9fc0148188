//! Connection management for SqliteIndex.

use super::SqliteIndex;
use super::transaction::Transaction;
use crate::index::{IndexError, IndexResult, create_schema};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory inside the vault that holds the cache database.
pub const CACHE_DIR: &str = ".trail";

/// File name of the cache database.
pub const CACHE_FILE: &str = "cache.db";

impl SqliteIndex {
    /// Opens an in-memory cache with the schema applied.
    pub fn open_in_memory() -> IndexResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        create_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Opens or creates a cache database at the given path.
    ///
    /// Creates parent directories if they don't exist.
    pub fn open(path: &Path) -> IndexResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| IndexError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        create_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Opens the cache that lives inside a vault, at `.trail/cache.db`.
    pub fn open_in_vault(root: &Path) -> IndexResult<Self> {
        Self::open(&Self::vault_db_path(root))
    }

    /// Returns where the cache of a vault is stored.
    pub fn vault_db_path(root: &Path) -> PathBuf {
        root.join(CACHE_DIR).join(CACHE_FILE)
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begins a transaction that rolls back on drop unless committed.
    pub fn transaction(&mut self) -> IndexResult<Transaction<'_>> {
        self.conn.execute_batch("BEGIN")?;
        Ok(Transaction::new(&self.conn))
    }
}
