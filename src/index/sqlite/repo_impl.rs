//! MetadataCache trait implementation for SqliteIndex.

use super::SqliteIndex;
use crate::domain::NoteKind;
use crate::index::{IndexError, IndexResult, MetadataCache, NoteMeta};
use crate::infra::ContentHash;
use chrono::NaiveDate;
use rusqlite::{OptionalExtension, Params, Row};
use std::path::{Path, PathBuf};

const SELECT_NOTES: &str = "SELECT path, kind, content_hash, completed, completion_date, parent, progress
     FROM notes";

/// A `notes` row before decoding.
struct NoteRow {
    path: String,
    kind: Option<String>,
    content_hash: String,
    completed: bool,
    completion_date: Option<String>,
    parent: Option<String>,
    progress: Option<f64>,
}

impl NoteRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            path: row.get(0)?,
            kind: row.get(1)?,
            content_hash: row.get(2)?,
            completed: row.get(3)?,
            completion_date: row.get(4)?,
            parent: row.get(5)?,
            progress: row.get(6)?,
        })
    }
}

impl SqliteIndex {
    fn query_notes<P: Params>(&self, sql: &str, params: P) -> IndexResult<Vec<NoteMeta>> {
        let rows = {
            let mut stmt = self.conn.prepare(sql)?;
            stmt.query_map(params, NoteRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?
        };
        rows.into_iter().map(|row| self.hydrate(row)).collect()
    }

    fn query_note<P: Params>(&self, sql: &str, params: P) -> IndexResult<Option<NoteMeta>> {
        let row = self
            .conn
            .query_row(sql, params, NoteRow::from_row)
            .optional()?;
        row.map(|row| self.hydrate(row)).transpose()
    }

    fn hydrate(&self, row: NoteRow) -> IndexResult<NoteMeta> {
        let content_hash = ContentHash::from_hex(&row.content_hash)
            .map_err(|e| IndexError::Corrupt(format!("content hash of {}: {}", row.path, e)))?;

        let subtopics: Vec<String> = self
            .conn
            .prepare("SELECT target FROM subtopic_refs WHERE note_path = ? ORDER BY position")?
            .query_map([&row.path], |r| r.get::<_, String>(0))?
            .collect::<Result<_, _>>()?;

        let mut builder = NoteMeta::builder(PathBuf::from(&row.path), content_hash)
            .completed(row.completed)
            .subtopics(subtopics);

        if let Some(kind) = row.kind {
            let kind: NoteKind = kind
                .parse()
                .map_err(|e| IndexError::Corrupt(format!("kind of {}: {}", row.path, e)))?;
            builder = builder.kind(kind);
        }
        if let Some(day) = row.completion_date {
            let day = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                .map_err(|e| IndexError::Corrupt(format!("date of {}: {}", row.path, e)))?;
            builder = builder.completion_date(day);
        }
        if let Some(parent) = row.parent {
            builder = builder.parent(parent);
        }
        if let Some(progress) = row.progress {
            builder = builder.progress(progress);
        }
        Ok(builder.build())
    }
}

impl MetadataCache for SqliteIndex {
    fn upsert(&mut self, meta: &NoteMeta) -> IndexResult<()> {
        let path = meta.path().to_string_lossy().into_owned();
        let tx = self.transaction()?;

        tx.execute(
            "INSERT INTO notes (path, name, kind, content_hash, completed, completion_date, parent, progress)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(path) DO UPDATE SET
                 name = excluded.name,
                 kind = excluded.kind,
                 content_hash = excluded.content_hash,
                 completed = excluded.completed,
                 completion_date = excluded.completion_date,
                 parent = excluded.parent,
                 progress = excluded.progress",
            rusqlite::params![
                path,
                meta.name(),
                meta.kind().map(|k| k.as_str()),
                meta.content_hash().as_str(),
                meta.completed(),
                meta.completion_date()
                    .map(|d| d.format("%Y-%m-%d").to_string()),
                meta.parent(),
                meta.progress(),
            ],
        )?;

        tx.execute("DELETE FROM subtopic_refs WHERE note_path = ?", [&path])?;
        for (position, target) in meta.subtopics().iter().enumerate() {
            tx.execute(
                "INSERT INTO subtopic_refs (note_path, position, target) VALUES (?, ?, ?)",
                rusqlite::params![path, position as i64, target],
            )?;
        }

        tx.commit()
    }

    fn remove_by_path(&mut self, path: &Path) -> IndexResult<bool> {
        let rows = self.conn.execute(
            "DELETE FROM notes WHERE path = ?",
            [path.to_string_lossy().as_ref()],
        )?;
        Ok(rows > 0)
    }

    fn clear(&mut self) -> IndexResult<()> {
        self.conn.execute("DELETE FROM notes", [])?;
        Ok(())
    }

    fn get_by_path(&self, path: &Path) -> IndexResult<Option<NoteMeta>> {
        self.query_note(
            &format!("{SELECT_NOTES} WHERE path = ?"),
            [path.to_string_lossy().as_ref()],
        )
    }

    fn get_by_name(&self, name: &str) -> IndexResult<Option<NoteMeta>> {
        self.query_note(&format!("{SELECT_NOTES} WHERE name = ? LIMIT 1"), [name])
    }

    fn list_by_kind(&self, kind: NoteKind) -> IndexResult<Vec<NoteMeta>> {
        self.query_notes(
            &format!("{SELECT_NOTES} WHERE kind = ? ORDER BY name"),
            [kind.as_str()],
        )
    }

    fn list_children(&self, parent: &str) -> IndexResult<Vec<NoteMeta>> {
        self.query_notes(
            &format!("{SELECT_NOTES} WHERE kind = 'subtopic' AND parent = ? ORDER BY name"),
            [parent],
        )
    }

    fn all_indexed_paths(&self) -> IndexResult<Vec<(PathBuf, ContentHash)>> {
        let mut stmt = self.conn.prepare("SELECT path, content_hash FROM notes")?;
        let results = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .filter_map(|r| r.ok())
            .filter_map(|(path, hash)| {
                ContentHash::from_hex(&hash)
                    .ok()
                    .map(|h| (PathBuf::from(path), h))
            })
            .collect();
        Ok(results)
    }
}
