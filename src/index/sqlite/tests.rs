use super::*;
use crate::domain::NoteKind;
use crate::index::{MetadataCache, NoteMeta};
use crate::infra::ContentHash;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

// ===========================================
// Test Helpers
// ===========================================

fn topic(name: &str, subtopics: &[&str]) -> NoteMeta {
    NoteMeta::builder(
        PathBuf::from(format!("{name}.md")),
        ContentHash::compute(name.as_bytes()),
    )
    .kind(NoteKind::Topic)
    .progress(0.0)
    .subtopics(subtopics.iter().map(|s| s.to_string()).collect())
    .build()
}

fn subtopic(name: &str, parent: &str, completed: bool) -> NoteMeta {
    let mut builder = NoteMeta::builder(
        PathBuf::from(format!("{name}.md")),
        ContentHash::compute(format!("{name}{completed}").as_bytes()),
    )
    .kind(NoteKind::Subtopic)
    .parent(parent)
    .completed(completed);
    if completed {
        builder = builder.completion_date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }
    builder.build()
}

// ===========================================
// Connection
// ===========================================

#[test]
fn open_in_memory_enables_foreign_keys() {
    let index = SqliteIndex::open_in_memory().unwrap();

    let fk_enabled: i32 = index
        .conn()
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();

    assert_eq!(fk_enabled, 1, "foreign keys should be enabled");
}

#[test]
fn open_in_vault_creates_cache_directory() {
    let dir = tempdir().unwrap();

    let _index = SqliteIndex::open_in_vault(dir.path()).unwrap();

    assert!(dir.path().join(".trail").join("cache.db").exists());
}

#[test]
fn open_existing_preserves_data() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("cache.db");

    {
        let mut index = SqliteIndex::open(&db_path).unwrap();
        index.upsert(&topic("Rust", &["[[A]]"])).unwrap();
    }

    let index = SqliteIndex::open(&db_path).unwrap();
    assert!(index.get_by_name("Rust").unwrap().is_some());
}

// ===========================================
// Upsert and Lookup
// ===========================================

#[test]
fn upsert_then_get_returns_same_metadata() {
    let mut index = SqliteIndex::open_in_memory().unwrap();
    let meta = subtopic("Ownership", "Rust", true);

    index.upsert(&meta).unwrap();

    assert_eq!(
        index.get_by_path(Path::new("Ownership.md")).unwrap(),
        Some(meta.clone())
    );
    assert_eq!(index.get_by_name("Ownership").unwrap(), Some(meta));
}

#[test]
fn upsert_keeps_subtopic_order_and_duplicates() {
    let mut index = SqliteIndex::open_in_memory().unwrap();
    index
        .upsert(&topic("Rust", &["[[B]]", "[[A]]", "[[B]]"]))
        .unwrap();

    let stored = index.get_by_name("Rust").unwrap().unwrap();
    assert_eq!(stored.subtopics(), &["[[B]]", "[[A]]", "[[B]]"]);
}

#[test]
fn upsert_replaces_previous_row() {
    let mut index = SqliteIndex::open_in_memory().unwrap();
    index.upsert(&topic("Rust", &["[[A]]", "[[B]]"])).unwrap();
    index.upsert(&topic("Rust", &["[[C]]"])).unwrap();

    let stored = index.get_by_name("Rust").unwrap().unwrap();
    assert_eq!(stored.subtopics(), &["[[C]]"]);
    assert_eq!(index.all_indexed_paths().unwrap().len(), 1);
}

#[test]
fn untyped_note_round_trips() {
    let mut index = SqliteIndex::open_in_memory().unwrap();
    let meta = NoteMeta::builder(PathBuf::from("inbox/Scratch.md"), ContentHash::compute(b"x")).build();

    index.upsert(&meta).unwrap();

    let stored = index.get_by_name("inbox/Scratch").unwrap().unwrap();
    assert_eq!(stored.kind(), None);
    assert_eq!(stored.progress(), None);
}

#[test]
fn get_unknown_is_none() {
    let index = SqliteIndex::open_in_memory().unwrap();
    assert_eq!(index.get_by_name("Nope").unwrap(), None);
    assert_eq!(index.get_by_path(Path::new("Nope.md")).unwrap(), None);
}

// ===========================================
// Listing
// ===========================================

#[test]
fn list_by_kind_is_sorted_by_name() {
    let mut index = SqliteIndex::open_in_memory().unwrap();
    index.upsert(&topic("Rust", &[])).unwrap();
    index.upsert(&topic("Go", &[])).unwrap();
    index.upsert(&subtopic("Ownership", "Rust", false)).unwrap();

    let names: Vec<String> = index
        .list_by_kind(NoteKind::Topic)
        .unwrap()
        .iter()
        .map(|m| m.name().to_string())
        .collect();
    assert_eq!(names, vec!["Go", "Rust"]);
}

#[test]
fn list_children_filters_by_parent() {
    let mut index = SqliteIndex::open_in_memory().unwrap();
    index.upsert(&subtopic("Traits", "Rust", false)).unwrap();
    index.upsert(&subtopic("Ownership", "Rust", true)).unwrap();
    index.upsert(&subtopic("Goroutines", "Go", false)).unwrap();

    let children: Vec<String> = index
        .list_children("Rust")
        .unwrap()
        .iter()
        .map(|m| m.name().to_string())
        .collect();
    assert_eq!(children, vec!["Ownership", "Traits"]);
}

// ===========================================
// Removal
// ===========================================

#[test]
fn remove_by_path_reports_whether_removed() {
    let mut index = SqliteIndex::open_in_memory().unwrap();
    index.upsert(&topic("Rust", &["[[A]]"])).unwrap();

    assert!(index.remove_by_path(Path::new("Rust.md")).unwrap());
    assert!(!index.remove_by_path(Path::new("Rust.md")).unwrap());

    let refs: i64 = index
        .conn()
        .query_row("SELECT COUNT(*) FROM subtopic_refs", [], |row| row.get(0))
        .unwrap();
    assert_eq!(refs, 0);
}

#[test]
fn clear_removes_everything() {
    let mut index = SqliteIndex::open_in_memory().unwrap();
    index.upsert(&topic("Rust", &[])).unwrap();
    index.upsert(&topic("Go", &[])).unwrap();

    index.clear().unwrap();

    assert!(index.all_indexed_paths().unwrap().is_empty());
}

#[test]
fn dropped_transaction_rolls_back() {
    let mut index = SqliteIndex::open_in_memory().unwrap();
    {
        let tx = index.transaction().unwrap();
        tx.execute(
            "INSERT INTO notes (path, name, content_hash) VALUES ('X.md', 'X', 'h')",
            [],
        )
        .unwrap();
    }
    let count: i64 = index
        .conn()
        .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}
