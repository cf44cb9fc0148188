//! Note store: reading, atomic writing, creating and resolving note files.

use crate::infra::content_hash::ContentHash;
use std::fs::OpenOptions;
use std::io::{self, Write as IoWrite};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Errors during file system operations on notes.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("note file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("note already exists: {path}")]
    AlreadyExists { path: PathBuf },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("atomic write failed for {path}: {source}")]
    AtomicWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parent directory does not exist: {path}")]
    ParentNotFound { path: PathBuf },

    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("invalid encoding in {path}: {encoding}")]
    InvalidEncoding { path: PathBuf, encoding: String },
}

impl FsError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => FsError::NotFound { path: path.into() },
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path: path.into() },
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists { path: path.into() },
            _ => FsError::Io {
                path: path.into(),
                source: error,
            },
        }
    }
}

/// Storage of note files addressed by vault-relative paths.
///
/// Writes report the hash of what was written so callers can recognise
/// change notifications caused by their own writes.
pub trait NoteStore {
    /// Reads the current on-disk text of a note.
    fn read(&self, path: &Path) -> Result<String, FsError>;

    /// Replaces a note's content.
    fn write(&self, path: &Path, content: &str) -> Result<ContentHash, FsError>;

    /// Creates a new note, failing with `FsError::AlreadyExists` if it exists.
    fn create(&self, path: &Path, content: &str) -> Result<ContentHash, FsError>;

    /// Resolves a note name to the relative path of `<name>.md`.
    ///
    /// Returns `None` if no regular file exists under that name.
    fn resolve(&self, name: &str) -> Option<PathBuf>;

    /// Lists all markdown notes, relative to the vault root.
    fn list_notes(&self) -> Result<Vec<PathBuf>, FsError>;
}

/// Returns the link name of a note: its relative path without `.md`.
///
/// ```
/// use std::path::Path;
/// use trail::infra::note_name;
///
/// assert_eq!(note_name(Path::new("rust/Ownership.md")), "rust/Ownership");
/// ```
pub fn note_name(path: &Path) -> String {
    let stem = path.with_extension("");
    stem.components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Returns the relative path a note name maps to, if the name is safe.
///
/// Absolute names and names with `..` segments are rejected.
pub fn note_path(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(format!("{}.md", name));
    let safe = path
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    safe.then_some(path)
}

/// A vault of markdown files on the local file system.
#[derive(Debug, Clone)]
pub struct FsNoteStore {
    root: PathBuf,
}

impl FsNoteStore {
    /// Opens a vault rooted at an existing directory.
    ///
    /// # Errors
    ///
    /// Returns `FsError::NotFound` if the directory doesn't exist and
    /// `FsError::NotADirectory` if the path is a file.
    pub fn open(root: &Path) -> Result<Self, FsError> {
        if !root.exists() {
            return Err(FsError::NotFound { path: root.into() });
        }
        if !root.is_dir() {
            return Err(FsError::NotADirectory { path: root.into() });
        }
        let root = root.canonicalize().map_err(|e| FsError::from_io(root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the absolute path of a vault-relative path.
    pub fn full_path(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Converts an absolute path inside the vault to a relative one.
    pub fn relative_path(&self, path: &Path) -> Option<PathBuf> {
        path.strip_prefix(&self.root).ok().map(Path::to_path_buf)
    }
}

impl NoteStore for FsNoteStore {
    fn read(&self, path: &Path) -> Result<String, FsError> {
        let full = self.full_path(path);
        let bytes = std::fs::read(&full).map_err(|e| FsError::from_io(path, e))?;
        decode_note(bytes, path)
    }

    fn write(&self, path: &Path, content: &str) -> Result<ContentHash, FsError> {
        write_atomic(&self.full_path(path), content)
    }

    fn create(&self, path: &Path, content: &str) -> Result<ContentHash, FsError> {
        let full = self.full_path(path);
        match full.parent() {
            Some(parent) if parent.exists() => {}
            Some(parent) => {
                return Err(FsError::ParentNotFound {
                    path: parent.into(),
                });
            }
            None => return Err(FsError::ParentNotFound { path: full }),
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .map_err(|e| FsError::from_io(path, e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| FsError::from_io(path, e))?;

        Ok(ContentHash::compute(content.as_bytes()))
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let path = note_path(name)?;
        self.full_path(&path).is_file().then_some(path)
    }

    fn list_notes(&self) -> Result<Vec<PathBuf>, FsError> {
        Ok(scan_notes_directory(&self.root)?.collect())
    }
}

/// Decodes note bytes as UTF-8, stripping a UTF-8 byte order mark.
fn decode_note(bytes: Vec<u8>, path: &Path) -> Result<String, FsError> {
    if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(FsError::InvalidEncoding {
            path: path.into(),
            encoding: "UTF-16 byte order mark detected; convert to UTF-8".into(),
        });
    }

    let content = String::from_utf8(bytes).map_err(|e| FsError::InvalidEncoding {
        path: path.into(),
        encoding: format!("invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()),
    })?;

    Ok(match content.strip_prefix('\u{FEFF}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// Writes a file atomically through a temporary file in the same directory.
fn write_atomic(path: &Path, content: &str) -> Result<ContentHash, FsError> {
    let parent = path
        .parent()
        .ok_or_else(|| FsError::ParentNotFound { path: path.into() })?;

    if !parent.exists() {
        return Err(FsError::ParentNotFound {
            path: parent.into(),
        });
    }

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| FsError::Io {
        path: path.into(),
        source: e,
    })?;

    temp.write_all(content.as_bytes())
        .map_err(|e| FsError::Io {
            path: path.into(),
            source: e,
        })?;

    temp.persist(path).map_err(|e| FsError::AtomicWrite {
        path: path.into(),
        source: e.error,
    })?;

    Ok(ContentHash::compute(content.as_bytes()))
}

/// Scans a directory recursively for markdown (.md) files.
///
/// Skips hidden files and directories, including the `.trail/` cache
/// directory. Returns paths relative to the input directory.
///
/// # Errors
///
/// Returns `FsError::NotFound` if the directory doesn't exist.
/// Returns `FsError::NotADirectory` if the path is not a directory.
pub fn scan_notes_directory(dir: &Path) -> Result<impl Iterator<Item = PathBuf>, FsError> {
    if !dir.exists() {
        return Err(FsError::NotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(FsError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let dir_owned = dir.to_path_buf();
    let iter = WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(has_md_extension)
        .filter_map(move |e| e.path().strip_prefix(&dir_owned).ok().map(Path::to_path_buf));

    Ok(iter)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|s| s.starts_with('.'))
}

fn has_md_extension(entry: &DirEntry) -> bool {
    entry.path().extension().is_some_and(|e| e == "md")
}
