//! SQLite-backed metadata cache implementation.

mod connection;
mod repo_impl;
mod transaction;

#[cfg(test)]
mod tests;

use rusqlite::Connection;

pub use transaction::Transaction;

// ===========================================
// SqliteIndex Struct
// ===========================================

/// SQLite-backed metadata cache.
pub struct SqliteIndex {
    pub(crate) conn: Connection,
}
