//! SQLite schema creation for the metadata cache.

use rusqlite::Connection;

/// Current schema version. Bump when the tables change shape.
pub const SCHEMA_VERSION: i64 = 1;

/// Creates the database schema for the metadata cache.
///
/// Idempotent: calling it on an existing database is safe.
///
/// # Tables Created
/// - `notes` - One row per markdown file, keyed by vault-relative path
/// - `subtopic_refs` - Ordered `subtopics` entries of topic notes
/// - `schema_version` - Schema version tracking
pub fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    // ===========================================
    // Notes Table
    // ===========================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS notes (
            path TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT,
            content_hash TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            completion_date TEXT,
            parent TEXT,
            progress REAL
        );",
    )?;

    // ===========================================
    // Subtopic References
    // ===========================================
    // Position keeps list order; duplicates are legal entries.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS subtopic_refs (
            note_path TEXT NOT NULL REFERENCES notes(path) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            target TEXT NOT NULL,
            PRIMARY KEY (note_path, position)
        );",
    )?;

    // ===========================================
    // Indexes
    // ===========================================
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_notes_name ON notes(name);
         CREATE INDEX IF NOT EXISTS idx_notes_kind ON notes(kind);
         CREATE INDEX IF NOT EXISTS idx_notes_parent ON notes(parent);",
    )?;

    // ===========================================
    // Schema Version Table
    // ===========================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
        [SCHEMA_VERSION],
    )?;

    Ok(())
}

/// Returns the current schema version.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get(0)
    })
}
