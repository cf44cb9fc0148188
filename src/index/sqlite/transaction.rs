//! RAII transaction for the cache connection.

use crate::index::IndexResult;
use rusqlite::{Connection, Params};

/// A database transaction that rolls back when dropped uncommitted.
///
/// A cache refresh that fails halfway leaves the previous rows in place.
pub struct Transaction<'a> {
    conn: &'a Connection,
    finished: bool,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            finished: false,
        }
    }

    /// Executes a statement inside the transaction.
    pub fn execute(&self, sql: &str, params: impl Params) -> IndexResult<usize> {
        Ok(self.conn.execute(sql, params)?)
    }

    pub fn commit(mut self) -> IndexResult<()> {
        self.conn.execute_batch("COMMIT")?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            // Errors cannot be reported from drop.
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}
