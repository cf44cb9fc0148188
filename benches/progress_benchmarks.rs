//! Benchmarks for frontmatter parsing and progress aggregation.
//!
//! Run with: cargo bench --bench progress_benchmarks

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use trail::index::{IndexBuilder, SqliteIndex};
use trail::infra::{FsNoteStore, Frontmatter};
use trail::progress::compute_topic_progress;
use trail::query::{load_topics, overall_progress};
use trail::sync::{SyncController, SyncSettings};

// =============================================================================
// Test Data Generation
// =============================================================================

const SUBJECTS: &[&str] = &[
    "Rust", "Go", "Haskell", "Zig", "Elixir", "Kotlin", "Swift", "OCaml",
];

fn subtopic_name(topic: usize, index: usize) -> String {
    format!("{}-{}", SUBJECTS[topic % SUBJECTS.len()], index)
}

/// Topic note listing `subtopics` block entries.
fn generate_topic(topic: usize, subtopics: usize) -> String {
    let mut out = String::from("---\ntype: topic\nsubtopics:\n");
    for i in 0..subtopics {
        out.push_str(&format!("  - \"[[{}]]\"\n", subtopic_name(topic, i)));
    }
    out.push_str("progress: 0\ntotal_subtopics: 0\ncompleted_subtopics: 0\ncreated: 2024-01-15\n");
    out.push_str("---\n# Topic\n\n## Progress\n0% complete\n\n## Subtopics\n\n## Notes\n\n");
    out
}

fn generate_subtopic(topic: usize, index: usize) -> String {
    format!(
        "---\ntype: subtopic\nparent: \"[[Topic {}]]\"\ncompleted: {}\ncreated: 2024-01-15\n---\n# {}\n\nStatus: ❌ Not completed\n",
        topic,
        index % 3 == 0,
        subtopic_name(topic, index)
    )
}

/// Creates a vault with `topics` topics of `per_topic` subtopics each.
///
/// Every fifth subtopic is left out so some entries resolve as missing.
fn create_vault(topics: usize, per_topic: usize) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    for t in 0..topics {
        let path = dir.path().join(format!("Topic {}.md", t));
        fs::write(path, generate_topic(t, per_topic)).expect("Failed to write topic");
        for i in (0..per_topic).filter(|i| i % 5 != 4) {
            let path = dir.path().join(format!("{}.md", subtopic_name(t, i)));
            fs::write(path, generate_subtopic(t, i)).expect("Failed to write subtopic");
        }
    }
    dir
}

// =============================================================================
// Parsing Benchmarks
// =============================================================================

fn bench_frontmatter_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("frontmatter_parse");

    for size in [10, 100, 1000] {
        let text = generate_topic(0, size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("subtopics", size), &text, |b, text| {
            b.iter(|| Frontmatter::from_document(text).map(|fm| fm.list("subtopics").len()));
        });
    }

    group.finish();
}

// =============================================================================
// Aggregation Benchmarks
// =============================================================================

fn bench_compute_topic_progress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_topic_progress");

    for size in [10, 100, 500] {
        let dir = create_vault(1, size);
        let store = FsNoteStore::open(dir.path()).unwrap();
        let topic = Path::new("Topic 0.md");

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("subtopics", size), &size, |b, _| {
            b.iter(|| compute_topic_progress(&store, topic).unwrap());
        });
    }

    group.finish();
}

fn bench_cached_overview(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_overview");

    for topics in [10, 50] {
        let dir = create_vault(topics, 20);
        let store = FsNoteStore::open(dir.path()).unwrap();
        let mut index = SqliteIndex::open_in_memory().unwrap();
        IndexBuilder::new(&store).full_rebuild(&mut index).unwrap();

        group.throughput(Throughput::Elements(topics as u64));
        group.bench_with_input(BenchmarkId::new("topics", topics), &topics, |b, _| {
            b.iter(|| overall_progress(&load_topics(&index).unwrap()));
        });
    }

    group.finish();
}

fn bench_force_update_unchanged(c: &mut Criterion) {
    let mut group = c.benchmark_group("force_update_unchanged");

    for size in [10, 100] {
        let dir = create_vault(1, size);
        let store = FsNoteStore::open(dir.path()).unwrap();
        let controller = SyncController::new(store, SyncSettings::default());
        let topic = Path::new("Topic 0.md");
        controller.force_update_topic(topic).unwrap();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("subtopics", size), &size, |b, _| {
            b.iter(|| controller.force_update_topic(topic).unwrap());
        });
    }

    group.finish();
}

criterion_group!(parse_benches, bench_frontmatter_parse);

criterion_group!(
    aggregate_benches,
    bench_compute_topic_progress,
    bench_cached_overview,
    bench_force_update_unchanged,
);

criterion_main!(parse_benches, aggregate_benches);
