//! Read-only progress queries over all topics.
//!
//! Every function here works on a snapshot of [`TopicSummary`] values and
//! never writes. Load the snapshot with [`load_topics`] (metadata cache, may
//! lag behind recent writes) or [`load_topics_fresh`] (re-reads the vault).

mod report;

pub use report::{ReportOptions, topic_report, vault_report};

use std::cmp::Ordering;
use std::path::PathBuf;

use serde::Serialize;

use crate::domain::{NoteKind, ProgressStatus, TopicProgress, percent, round_ratio};
use crate::index::{IndexResult, MetadataCache};
use crate::infra::{FsError, Frontmatter, NoteStore, note_name};
use crate::progress::{SubtopicEntry, cached_topic_progress, compute_topic_progress};

/// Default progress below which a topic counts as a knowledge gap.
pub const DEFAULT_GAP_THRESHOLD: f64 = 0.3;

/// Default number of topics listed by recommendations and gaps.
pub const DEFAULT_LIMIT: usize = 5;

/// One topic and its aggregated progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSummary {
    pub name: String,
    pub path: PathBuf,
    pub progress: TopicProgress,
    pub entries: Vec<SubtopicEntry>,
    /// The `progress` field as written in the topic's frontmatter.
    pub recorded: Option<f64>,
}

impl TopicSummary {
    /// Aggregated ratio, or the recorded `progress` for a topic that lists
    /// no subtopics (those are never recomputed).
    pub fn ratio(&self) -> f64 {
        match self.recorded {
            Some(recorded) if self.progress.total() == 0 => recorded.clamp(0.0, 1.0),
            _ => self.progress.ratio(),
        }
    }

    pub fn rounded(&self) -> f64 {
        round_ratio(self.ratio())
    }

    pub fn percent(&self) -> u32 {
        percent(self.ratio())
    }

    pub fn status(&self) -> ProgressStatus {
        ProgressStatus::from_ratio(self.ratio())
    }
}

/// Loads every topic from the metadata cache, ordered by name.
pub fn load_topics<C: MetadataCache + ?Sized>(cache: &C) -> IndexResult<Vec<TopicSummary>> {
    cache
        .list_by_kind(NoteKind::Topic)?
        .into_iter()
        .map(|meta| {
            let snapshot = cached_topic_progress(cache, &meta)?;
            Ok(TopicSummary {
                name: meta.name().to_string(),
                path: meta.path().to_path_buf(),
                progress: snapshot.progress,
                entries: snapshot.entries,
                recorded: meta.progress(),
            })
        })
        .collect()
}

/// Loads every topic by reading the vault directly, ordered by name.
pub fn load_topics_fresh<S: NoteStore + ?Sized>(store: &S) -> Result<Vec<TopicSummary>, FsError> {
    let mut topics = Vec::new();
    for path in store.list_notes()? {
        let text = match store.read(&path) {
            Ok(text) => text,
            Err(FsError::InvalidEncoding { .. }) => continue,
            Err(e) => return Err(e),
        };
        let Some(frontmatter) = Frontmatter::from_document(&text) else {
            continue;
        };
        if frontmatter.kind() != Some(NoteKind::Topic) {
            continue;
        }
        let recorded = frontmatter.number("progress");
        let summary = match compute_topic_progress(store, &path)? {
            Some(snapshot) => TopicSummary {
                name: note_name(&path),
                path,
                progress: snapshot.progress,
                entries: snapshot.entries,
                recorded,
            },
            None => TopicSummary {
                name: note_name(&path),
                path,
                progress: TopicProgress::new(0, 0),
                entries: Vec::new(),
                recorded,
            },
        };
        topics.push(summary);
    }
    topics.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(topics)
}

/// Total completed subtopics over total subtopics, across all topics.
///
/// Topics weigh by their number of subtopics. Zero when there are none.
pub fn overall_progress(topics: &[TopicSummary]) -> TopicProgress {
    let (completed, total) = topics.iter().fold((0, 0), |(c, t), topic| {
        (c + topic.progress.completed(), t + topic.progress.total())
    });
    TopicProgress::new(completed, total)
}

/// Topics grouped by [`ProgressStatus`], each group in input order.
#[derive(Debug, Default, Serialize)]
pub struct StatusGroups<'a> {
    pub not_started: Vec<&'a TopicSummary>,
    pub in_progress: Vec<&'a TopicSummary>,
    pub completed: Vec<&'a TopicSummary>,
}

pub fn topics_by_status(topics: &[TopicSummary]) -> StatusGroups<'_> {
    let mut groups = StatusGroups::default();
    for topic in topics {
        match topic.status() {
            ProgressStatus::NotStarted => groups.not_started.push(topic),
            ProgressStatus::InProgress => groups.in_progress.push(topic),
            ProgressStatus::Completed => groups.completed.push(topic),
        }
    }
    groups
}

/// In-progress topics, closest to done first, at most `limit`.
pub fn recommended_topics(topics: &[TopicSummary], limit: usize) -> Vec<&TopicSummary> {
    let mut picked: Vec<&TopicSummary> = topics
        .iter()
        .filter(|t| t.status() == ProgressStatus::InProgress)
        .collect();
    picked.sort_by(|a, b| by_ratio(b, a));
    picked.truncate(limit);
    picked
}

/// Topics below `threshold`, least progressed first, at most `limit`.
pub fn knowledge_gaps(topics: &[TopicSummary], threshold: f64, limit: usize) -> Vec<&TopicSummary> {
    let mut picked: Vec<&TopicSummary> = topics.iter().filter(|t| t.ratio() < threshold).collect();
    picked.sort_by(|a, b| by_ratio(a, b));
    picked.truncate(limit);
    picked
}

fn by_ratio(a: &TopicSummary, b: &TopicSummary) -> Ordering {
    a.ratio().total_cmp(&b.ratio())
}
