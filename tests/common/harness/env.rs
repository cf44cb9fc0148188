//! Isolated test vault with temp directory.

// Allow dead code since this is a test utility with methods for future tests
#![allow(dead_code)]

use super::{TestNote, TrailCommand};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use trail::index::{IndexBuilder, SqliteIndex};
use trail::infra::FsNoteStore;

/// Isolated test environment with a temporary vault.
///
/// The vault and a separate config directory are cleaned up on drop.
pub struct TestEnv {
    /// The temporary directory (kept for lifetime management)
    _temp_dir: TempDir,
    /// Path to the vault
    notes_dir: PathBuf,
    /// Stands in for the user's config directory
    config_dir: PathBuf,
}

impl TestEnv {
    /// Creates a new isolated test environment with an empty vault.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let notes_dir = temp_dir.path().join("vault");
        let config_dir = temp_dir.path().join("config");
        std::fs::create_dir_all(&notes_dir).expect("Failed to create vault");
        std::fs::create_dir_all(&config_dir).expect("Failed to create config dir");
        Self {
            _temp_dir: temp_dir,
            notes_dir,
            config_dir,
        }
    }

    /// Returns the path to the vault.
    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    /// Returns the directory used as `XDG_CONFIG_HOME` for commands.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the path where the metadata cache is stored.
    pub fn cache_path(&self) -> PathBuf {
        SqliteIndex::vault_db_path(&self.notes_dir)
    }

    /// Writes a note into the vault and returns its path.
    pub fn add_note(&self, note: &TestNote) -> PathBuf {
        self.write_file(&note.file_name(), &note.render())
    }

    /// Writes a file to the vault and returns its path.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.notes_dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Writes `config.toml` for commands run from this environment.
    pub fn write_config(&self, content: &str) {
        let dir = self.config_dir.join("trail");
        std::fs::create_dir_all(&dir).expect("Failed to create config dir");
        std::fs::write(dir.join("config.toml"), content).expect("Failed to write config");
    }

    /// Reads a note by name.
    pub fn read_note(&self, name: &str) -> String {
        std::fs::read_to_string(self.notes_dir.join(format!("{name}.md")))
            .unwrap_or_else(|e| panic!("Failed to read note {}: {}", name, e))
    }

    /// Builds the metadata cache from all notes in the vault.
    pub fn build_cache(&self) -> Result<SqliteIndex> {
        let store = FsNoteStore::open(&self.notes_dir)?;
        let mut index = SqliteIndex::open(&self.cache_path())?;
        IndexBuilder::new(&store).full_rebuild(&mut index)?;
        Ok(index)
    }

    /// Creates a TrailCommand configured for this test environment.
    pub fn cmd(&self) -> TrailCommand {
        TrailCommand::new()
            .config_home(&self.config_dir)
            .dir(&self.notes_dir)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trail::domain::NoteKind;
    use trail::index::MetadataCache;

    #[test]
    fn test_env_creates_temp_directory() {
        let env = TestEnv::new();
        assert!(env.notes_dir().is_dir(), "vault should be a directory");
    }

    #[test]
    fn test_env_cleanup_on_drop() {
        let path = {
            let env = TestEnv::new();
            env.notes_dir().to_path_buf()
        };
        assert!(!path.exists(), "temp directory should be cleaned up on drop");
    }

    #[test]
    fn test_env_cache_path() {
        let env = TestEnv::new();
        let cache_path = env.cache_path();
        assert!(cache_path.ends_with(".trail/cache.db"));
        assert!(cache_path.starts_with(env.notes_dir()));
    }

    #[test]
    fn test_env_provides_command() {
        let env = TestEnv::new();
        let args = env.cmd().get_args().to_vec();
        assert_eq!(args[0], "--dir");
        assert_eq!(args[1], env.notes_dir().to_string_lossy());
    }

    #[test]
    fn test_env_build_cache_includes_notes() {
        let env = TestEnv::new();
        env.add_note(&TestNote::topic("Rust").listing("A"));
        env.add_note(&TestNote::subtopic("A").parent("Rust"));

        let index = env.build_cache().expect("Should build cache");

        let topics = index.list_by_kind(NoteKind::Topic).unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].name(), "Rust");
        assert_eq!(index.list_children("Rust").unwrap().len(), 1);
    }
}
