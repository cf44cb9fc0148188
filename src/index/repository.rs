//! MetadataCache trait and cached note metadata.

use crate::domain::{NoteKind, extract_link_text};
use crate::infra::{ContentHash, Frontmatter, note_name};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ===========================================
// IndexError Type
// ===========================================

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored row could not be decoded.
    #[error("corrupt cache row: {0}")]
    Corrupt(String),

    /// An I/O error occurred.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for cache operations.
pub type IndexResult<T> = Result<T, IndexError>;

// ===========================================
// NoteMeta
// ===========================================

/// The cached view of one note's frontmatter.
///
/// Holds only what progress queries need. Notes without a recognised `type`
/// are cached too, so subtopic references can be resolved by name.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteMeta {
    path: PathBuf,
    name: String,
    kind: Option<NoteKind>,
    content_hash: ContentHash,
    completed: bool,
    completion_date: Option<NaiveDate>,
    parent: Option<String>,
    progress: Option<f64>,
    subtopics: Vec<String>,
}

impl NoteMeta {
    /// Creates a builder; the note name is derived from `path`.
    pub fn builder(path: PathBuf, content_hash: ContentHash) -> NoteMetaBuilder {
        NoteMetaBuilder {
            name: note_name(&path),
            path,
            kind: None,
            content_hash,
            completed: false,
            completion_date: None,
            parent: None,
            progress: None,
            subtopics: Vec::new(),
        }
    }

    /// Extracts metadata from a note's full text.
    pub fn from_document(path: &Path, text: &str) -> Self {
        let builder = Self::builder(path.to_path_buf(), ContentHash::compute(text.as_bytes()));
        let Some(fm) = Frontmatter::from_document(text) else {
            return builder.build();
        };

        let date = |key: &str| {
            fm.scalar(key)
                .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
        };

        let mut builder = builder
            .completed(fm.bool_field("completed").unwrap_or(false))
            .subtopics(fm.list("subtopics"));
        if let Some(kind) = fm.kind() {
            builder = builder.kind(kind);
        }
        if let Some(day) = date("completion_date") {
            builder = builder.completion_date(day);
        }
        if let Some(parent) = fm.scalar("parent") {
            let name = extract_link_text(parent.trim()).trim();
            if !name.is_empty() {
                builder = builder.parent(name);
            }
        }
        if let Some(progress) = fm.number("progress") {
            builder = builder.progress(progress);
        }
        builder.build()
    }

    /// Vault-relative path of the note.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Link name (`path` without `.md`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Option<NoteKind> {
        self.kind
    }

    pub fn content_hash(&self) -> &ContentHash {
        &self.content_hash
    }

    /// Whether `completed` was literally `true`.
    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn completion_date(&self) -> Option<NaiveDate> {
        self.completion_date
    }

    /// Name of the parent topic, brackets stripped.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// `progress` as last written into the frontmatter.
    pub fn progress(&self) -> Option<f64> {
        self.progress
    }

    /// Raw `subtopics` entries in list order.
    pub fn subtopics(&self) -> &[String] {
        &self.subtopics
    }
}

/// Builder for [`NoteMeta`].
pub struct NoteMetaBuilder {
    path: PathBuf,
    name: String,
    kind: Option<NoteKind>,
    content_hash: ContentHash,
    completed: bool,
    completion_date: Option<NaiveDate>,
    parent: Option<String>,
    progress: Option<f64>,
    subtopics: Vec<String>,
}

impl NoteMetaBuilder {
    pub fn kind(mut self, kind: NoteKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub fn completion_date(mut self, day: NaiveDate) -> Self {
        self.completion_date = Some(day);
        self
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn subtopics(mut self, subtopics: Vec<String>) -> Self {
        self.subtopics = subtopics;
        self
    }

    pub fn build(self) -> NoteMeta {
        NoteMeta {
            path: self.path,
            name: self.name,
            kind: self.kind,
            content_hash: self.content_hash,
            completed: self.completed,
            completion_date: self.completion_date,
            parent: self.parent,
            progress: self.progress,
            subtopics: self.subtopics,
        }
    }
}

// ===========================================
// MetadataCache Trait
// ===========================================

/// A possibly stale view of parsed note frontmatter.
///
/// Readers must tolerate lag: a note written a moment ago may still show its
/// previous metadata until the cache is refreshed.
pub trait MetadataCache {
    /// Inserts or replaces the metadata of a note, keyed by path.
    fn upsert(&mut self, meta: &NoteMeta) -> IndexResult<()>;

    /// Removes a note by path. Returns `true` if something was removed.
    fn remove_by_path(&mut self, path: &Path) -> IndexResult<bool>;

    /// Removes every note.
    fn clear(&mut self) -> IndexResult<()>;

    fn get_by_path(&self, path: &Path) -> IndexResult<Option<NoteMeta>>;

    /// Looks a note up by link name.
    fn get_by_name(&self, name: &str) -> IndexResult<Option<NoteMeta>>;

    /// Lists notes of one kind, ordered by name.
    fn list_by_kind(&self, kind: NoteKind) -> IndexResult<Vec<NoteMeta>>;

    /// Lists subtopics whose `parent` names the given topic, ordered by name.
    fn list_children(&self, parent: &str) -> IndexResult<Vec<NoteMeta>>;

    /// Returns all cached paths with their content hashes.
    fn all_indexed_paths(&self) -> IndexResult<Vec<(PathBuf, ContentHash)>>;
}
