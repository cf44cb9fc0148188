//! Builds and refreshes the metadata cache from the notes in a vault.

use crate::index::{IndexResult, MetadataCache, NoteMeta};
use crate::infra::{ContentHash, FsError, NoteStore};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// ===========================================
// BuildError Type
// ===========================================

/// Errors that can occur when caching individual files.
#[derive(Debug)]
pub enum BuildError {
    /// I/O error reading the file.
    Io { path: PathBuf, message: String },
    /// The file is not valid UTF-8.
    Encoding { path: PathBuf, message: String },
}

impl BuildError {
    fn from_fs(error: FsError, path: &Path) -> Self {
        match error {
            FsError::InvalidEncoding { encoding, .. } => BuildError::Encoding {
                path: path.to_path_buf(),
                message: encoding,
            },
            e => BuildError::Io {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        }
    }

    /// Returns the path of the file that caused the error.
    pub fn path(&self) -> &Path {
        match self {
            BuildError::Io { path, .. } => path,
            BuildError::Encoding { path, .. } => path,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            BuildError::Io { message, .. } => message,
            BuildError::Encoding { message, .. } => message,
        }
    }
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path().display(), self.message())
    }
}

impl std::error::Error for BuildError {}

// ===========================================
// Result Types
// ===========================================

/// Result of a full cache rebuild.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of notes cached.
    pub indexed: usize,
    pub errors: Vec<BuildError>,
}

/// Result of an incremental cache update.
#[derive(Debug, Default)]
pub struct UpdateResult {
    pub added: usize,
    pub modified: usize,
    /// Notes whose file no longer exists.
    pub removed: usize,
    pub errors: Vec<BuildError>,
}

// ===========================================
// Progress Reporting
// ===========================================

/// Result of processing a single file.
#[derive(Debug, Clone)]
pub enum FileResult {
    Indexed,
    /// Unchanged since the last update.
    Skipped,
    Error(String),
}

/// Receives per-file updates during cache operations.
pub trait ProgressReporter {
    fn on_file(&mut self, path: &Path, result: FileResult);
    fn on_complete(&mut self, indexed: usize, errors: usize);
}

#[derive(Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_file(&mut self, _path: &Path, _result: FileResult) {}
    fn on_complete(&mut self, _indexed: usize, _errors: usize) {}
}

// ===========================================
// IndexBuilder
// ===========================================

/// Fills a [`MetadataCache`] from the notes of a [`NoteStore`].
///
/// Supports full rebuilds, content-hash incremental updates, and refreshing
/// a known set of paths after the sync controller wrote them.
pub struct IndexBuilder<'a, S: NoteStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: NoteStore + ?Sized> IndexBuilder<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Clears the cache and re-reads every note.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault cannot be scanned or a database
    /// operation fails. Per-file errors are collected in the result.
    pub fn full_rebuild<C: MetadataCache + ?Sized>(&self, cache: &mut C) -> IndexResult<BuildResult> {
        self.full_rebuild_with_progress(cache, &mut NoopReporter)
    }

    pub fn full_rebuild_with_progress<C: MetadataCache + ?Sized, P: ProgressReporter>(
        &self,
        cache: &mut C,
        progress: &mut P,
    ) -> IndexResult<BuildResult> {
        cache.clear()?;

        let mut indexed = 0;
        let mut errors = Vec::new();

        for path in self.scan()? {
            match self.store.read(&path) {
                Ok(text) => {
                    cache.upsert(&NoteMeta::from_document(&path, &text))?;
                    indexed += 1;
                    progress.on_file(&path, FileResult::Indexed);
                }
                Err(e) => {
                    let error = BuildError::from_fs(e, &path);
                    warn!(%error, "skipping note");
                    progress.on_file(&path, FileResult::Error(error.message().to_string()));
                    errors.push(error);
                }
            }
        }

        debug!(indexed, errors = errors.len(), "cache rebuilt");
        progress.on_complete(indexed, errors.len());
        Ok(BuildResult { indexed, errors })
    }

    /// Updates only notes whose content hash changed, and drops deleted ones.
    pub fn incremental_update<C: MetadataCache + ?Sized>(
        &self,
        cache: &mut C,
    ) -> IndexResult<UpdateResult> {
        self.incremental_update_with_progress(cache, &mut NoopReporter)
    }

    pub fn incremental_update_with_progress<C: MetadataCache + ?Sized, P: ProgressReporter>(
        &self,
        cache: &mut C,
        progress: &mut P,
    ) -> IndexResult<UpdateResult> {
        let indexed: HashMap<PathBuf, ContentHash> =
            cache.all_indexed_paths()?.into_iter().collect();
        let current = self.scan()?;
        let current_set: HashSet<&PathBuf> = current.iter().collect();

        let mut result = UpdateResult::default();

        for path in &current {
            let text = match self.store.read(path) {
                Ok(text) => text,
                Err(e) => {
                    let error = BuildError::from_fs(e, path);
                    warn!(%error, "skipping note");
                    progress.on_file(path, FileResult::Error(error.message().to_string()));
                    result.errors.push(error);
                    continue;
                }
            };

            let meta = NoteMeta::from_document(path, &text);
            match indexed.get(path) {
                None => {
                    cache.upsert(&meta)?;
                    result.added += 1;
                    progress.on_file(path, FileResult::Indexed);
                }
                Some(hash) if hash != meta.content_hash() => {
                    cache.upsert(&meta)?;
                    result.modified += 1;
                    progress.on_file(path, FileResult::Indexed);
                }
                Some(_) => progress.on_file(path, FileResult::Skipped),
            }
        }

        for path in indexed.keys() {
            if !current_set.contains(path) && cache.remove_by_path(path)? {
                result.removed += 1;
            }
        }

        debug!(
            added = result.added,
            modified = result.modified,
            removed = result.removed,
            "cache updated"
        );
        progress.on_complete(result.added + result.modified, result.errors.len());
        Ok(result)
    }

    /// Re-reads the given notes, removing those that no longer exist.
    ///
    /// Used after a sync pass so queries see the controller's writes.
    pub fn refresh_paths<C: MetadataCache + ?Sized>(
        &self,
        cache: &mut C,
        paths: &[PathBuf],
    ) -> IndexResult<UpdateResult> {
        let mut result = UpdateResult::default();
        for path in paths {
            match self.store.read(path) {
                Ok(text) => {
                    let existed = cache.get_by_path(path)?.is_some();
                    cache.upsert(&NoteMeta::from_document(path, &text))?;
                    if existed {
                        result.modified += 1;
                    } else {
                        result.added += 1;
                    }
                }
                Err(FsError::NotFound { .. }) => {
                    if cache.remove_by_path(path)? {
                        result.removed += 1;
                    }
                }
                Err(e) => result.errors.push(BuildError::from_fs(e, path)),
            }
        }
        Ok(result)
    }

    fn scan(&self) -> IndexResult<Vec<PathBuf>> {
        self.store
            .list_notes()
            .map_err(|e| crate::index::IndexError::Io {
                path: PathBuf::from("."),
                source: std::io::Error::other(e.to_string()),
            })
    }
}
