//! Aggregation of subtopic completion into topic progress.
//!
//! Two read paths exist on purpose:
//!
//! - [`compute_topic_progress`] re-reads the topic and every subtopic from
//!   the note store. It always sees the latest writes and is what the sync
//!   controller uses before writing anything back.
//! - [`cached_topic_progress`] reads from the metadata cache. It is fast but
//!   may lag behind writes that have not been re-indexed yet; queries and
//!   reports use it.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::{NoteKind, SubtopicState, TopicProgress, extract_link_text};
use crate::index::{IndexResult, MetadataCache, NoteMeta};
use crate::infra::{FsError, Frontmatter, NoteStore};

/// One entry of a topic's `subtopics` list, resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtopicEntry {
    /// Note name the entry points at (brackets stripped).
    pub name: String,
    /// Resolved path, `None` when the note does not exist.
    pub path: Option<PathBuf>,
    pub state: SubtopicState,
}

impl SubtopicEntry {
    fn missing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: None,
            state: SubtopicState::Missing,
        }
    }
}

/// Progress of a topic together with the per-entry states it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSnapshot {
    pub progress: TopicProgress,
    pub entries: Vec<SubtopicEntry>,
}

impl TopicSnapshot {
    fn from_entries(entries: Vec<SubtopicEntry>) -> Self {
        let completed = entries.iter().filter(|e| e.state.is_completed()).count();
        Self {
            progress: TopicProgress::new(completed, entries.len()),
            entries,
        }
    }
}

/// Recomputes a topic's progress from disk.
///
/// Returns `Ok(None)` when the note has no frontmatter, is not a topic, or
/// has an empty `subtopics` list.
///
/// # Errors
///
/// Returns `FsError` if the topic or one of its subtopics cannot be read.
/// A subtopic that does not exist is not an error; it counts as missing.
pub fn compute_topic_progress<S: NoteStore + ?Sized>(
    store: &S,
    topic: &Path,
) -> Result<Option<TopicSnapshot>, FsError> {
    let text = store.read(topic)?;
    match Frontmatter::from_document(&text) {
        Some(frontmatter) => aggregate_frontmatter(store, &frontmatter),
        None => Ok(None),
    }
}

/// Aggregates an already parsed topic frontmatter, reading subtopics from disk.
pub fn aggregate_frontmatter<S: NoteStore + ?Sized>(
    store: &S,
    frontmatter: &Frontmatter,
) -> Result<Option<TopicSnapshot>, FsError> {
    if frontmatter.kind() != Some(NoteKind::Topic) {
        return Ok(None);
    }

    let references = frontmatter.list("subtopics");
    if references.is_empty() {
        return Ok(None);
    }

    let mut entries = Vec::with_capacity(references.len());
    for reference in &references {
        entries.push(read_subtopic(store, reference)?);
    }

    Ok(Some(TopicSnapshot::from_entries(entries)))
}

fn read_subtopic<S: NoteStore + ?Sized>(
    store: &S,
    reference: &str,
) -> Result<SubtopicEntry, FsError> {
    let name = extract_link_text(reference).trim();
    let Some(path) = store.resolve(name) else {
        return Ok(SubtopicEntry::missing(name));
    };

    let text = match store.read(&path) {
        Ok(text) => text,
        // Deleted between resolve and read.
        Err(FsError::NotFound { .. }) => return Ok(SubtopicEntry::missing(name)),
        Err(e) => return Err(e),
    };

    let completed = Frontmatter::from_document(&text)
        .and_then(|fm| fm.bool_field("completed"))
        .unwrap_or(false);

    Ok(SubtopicEntry {
        name: name.to_string(),
        path: Some(path),
        state: if completed {
            SubtopicState::Completed
        } else {
            SubtopicState::Incomplete
        },
    })
}

/// Computes a topic's progress from the metadata cache.
///
/// Unlike [`compute_topic_progress`] a topic without subtopics yields a
/// `0/0` snapshot instead of nothing, so it can still be listed.
pub fn cached_topic_progress<C: MetadataCache + ?Sized>(
    cache: &C,
    topic: &NoteMeta,
) -> IndexResult<TopicSnapshot> {
    let mut entries = Vec::with_capacity(topic.subtopics().len());
    for reference in topic.subtopics() {
        let name = extract_link_text(reference).trim();
        let entry = match cache.get_by_name(name)? {
            Some(meta) => SubtopicEntry {
                name: name.to_string(),
                state: if meta.completed() {
                    SubtopicState::Completed
                } else {
                    SubtopicState::Incomplete
                },
                path: Some(meta.path().to_path_buf()),
            },
            None => SubtopicEntry::missing(name),
        };
        entries.push(entry);
    }
    Ok(TopicSnapshot::from_entries(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexBuilder, SqliteIndex};
    use crate::infra::FsNoteStore;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn vault(notes: &[(&str, &str)]) -> (TempDir, FsNoteStore) {
        let dir = TempDir::new().unwrap();
        for (name, content) in notes {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        let store = FsNoteStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn subtopic(completed: bool) -> String {
        format!(
            "---\ntype: subtopic\nparent: \"[[Rust]]\"\ncompleted: {}\n---\n",
            completed
        )
    }

    const RUST: &str = "---
type: topic
progress: 0
subtopics:
  - \"[[A]]\"
  - \"[[B]]\"
  - \"[[C]]\"
---
";

    #[test]
    fn counts_completed_and_missing() {
        let (_dir, store) = vault(&[
            ("Rust.md", RUST),
            ("A.md", &subtopic(true)),
            ("B.md", &subtopic(true)),
        ]);

        let snapshot = compute_topic_progress(&store, Path::new("Rust.md"))
            .unwrap()
            .unwrap();

        assert_eq!(snapshot.progress, TopicProgress::new(2, 3));
        assert_eq!(snapshot.progress.rounded(), 0.67);
        let states: Vec<SubtopicState> = snapshot.entries.iter().map(|e| e.state).collect();
        assert_eq!(
            states,
            vec![
                SubtopicState::Completed,
                SubtopicState::Completed,
                SubtopicState::Missing
            ]
        );
        assert_eq!(snapshot.entries[2].path, None);
    }

    #[test]
    fn heading_links_resolve_to_the_note() {
        let topic = "---\ntype: topic\nsubtopics:\n  - \"[[A#Intro]]\"\n  - \"[[B#^x1|later]]\"\n---\n";
        let (_dir, store) = vault(&[
            ("Rust.md", topic),
            ("A.md", &subtopic(true)),
            ("B.md", &subtopic(false)),
        ]);

        let snapshot = compute_topic_progress(&store, Path::new("Rust.md"))
            .unwrap()
            .unwrap();

        assert_eq!(snapshot.progress, TopicProgress::new(1, 2));
        assert_eq!(snapshot.entries[0].name, "A");
        assert_eq!(snapshot.entries[1].state, SubtopicState::Incomplete);
    }

    #[test]
    fn completed_must_be_literal_true() {
        let (_dir, store) = vault(&[
            ("Rust.md", RUST),
            ("A.md", "---\ntype: subtopic\ncompleted: yes\n---\n"),
            ("B.md", "no frontmatter"),
            ("C.md", &subtopic(false)),
        ]);

        let snapshot = compute_topic_progress(&store, Path::new("Rust.md"))
            .unwrap()
            .unwrap();

        assert_eq!(snapshot.progress, TopicProgress::new(0, 3));
        assert!(
            snapshot
                .entries
                .iter()
                .all(|e| e.state == SubtopicState::Incomplete)
        );
    }

    #[test]
    fn duplicates_are_counted_twice() {
        let (_dir, store) = vault(&[
            (
                "Rust.md",
                "---\ntype: topic\nsubtopics: [\"[[A]]\", \"[[A]]\"]\n---\n",
            ),
            ("A.md", &subtopic(true)),
        ]);

        let snapshot = compute_topic_progress(&store, Path::new("Rust.md"))
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.progress, TopicProgress::new(2, 2));
    }

    #[test]
    fn non_topic_yields_nothing() {
        let (_dir, store) = vault(&[("A.md", &subtopic(true)), ("Plain.md", "# no fm")]);
        assert_eq!(compute_topic_progress(&store, Path::new("A.md")).unwrap(), None);
        assert_eq!(
            compute_topic_progress(&store, Path::new("Plain.md")).unwrap(),
            None
        );
    }

    #[test]
    fn empty_subtopics_yields_nothing() {
        let (_dir, store) = vault(&[("Rust.md", "---\ntype: topic\nsubtopics: []\n---\n")]);
        assert_eq!(
            compute_topic_progress(&store, Path::new("Rust.md")).unwrap(),
            None
        );
    }

    #[test]
    fn missing_topic_is_an_error() {
        let (_dir, store) = vault(&[]);
        assert!(matches!(
            compute_topic_progress(&store, Path::new("Rust.md")),
            Err(FsError::NotFound { .. })
        ));
    }

    #[test]
    fn cached_path_can_lag_behind_disk() {
        let (dir, store) = vault(&[
            ("Rust.md", RUST),
            ("A.md", &subtopic(false)),
            ("B.md", &subtopic(false)),
            ("C.md", &subtopic(false)),
        ]);
        let mut index = SqliteIndex::open_in_memory().unwrap();
        IndexBuilder::new(&store).full_rebuild(&mut index).unwrap();

        std::fs::write(dir.path().join("A.md"), subtopic(true)).unwrap();

        let topic = index.get_by_name("Rust").unwrap().unwrap();
        let cached = cached_topic_progress(&index, &topic).unwrap();
        let fresh = compute_topic_progress(&store, Path::new("Rust.md"))
            .unwrap()
            .unwrap();

        assert_eq!(cached.progress, TopicProgress::new(0, 3));
        assert_eq!(fresh.progress, TopicProgress::new(1, 3));
    }

    #[test]
    fn cached_path_marks_unknown_names_missing() {
        let (_dir, store) = vault(&[("Rust.md", RUST), ("A.md", &subtopic(true))]);
        let mut index = SqliteIndex::open_in_memory().unwrap();
        IndexBuilder::new(&store).full_rebuild(&mut index).unwrap();

        let topic = index.get_by_name("Rust").unwrap().unwrap();
        let cached = cached_topic_progress(&index, &topic).unwrap();
        assert_eq!(cached.progress, TopicProgress::new(1, 3));
        assert_eq!(cached.entries[1].state, SubtopicState::Missing);
    }
}
