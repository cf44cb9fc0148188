//! Lease-guarded recomputation of topic progress.
//!
//! The controller is the only component that writes derived fields. It keeps
//! three pieces of state, all behind interior mutability so a lease (which
//! borrows the controller) can be held while notes are rewritten:
//!
//! - the [`UpdateGate`] handing out the single [`UpdateLease`]
//! - the [`PendingQueue`] of paths reported as changed
//! - the content hash of the controller's last write to each path, so a
//!   notification caused by that write is recognised and skipped

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::{LinkRef, NoteKind, TopicProgress};
use crate::infra::{
    ContentHash, FsError, Frontmatter, NoteStore, note_path, read_status_line,
    replace_frontmatter_block,
};
use crate::progress::{
    DEFAULT_BAR_WIDTH, aggregate_frontmatter, render_subtopic_note, render_topic_note,
    rewrite_status, rewrite_topic, status_line,
};
use crate::sync::lease::{UpdateGate, UpdateLease};
use crate::sync::pending::PendingQueue;

/// Quiet period before queued notifications are processed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

// ===========================================
// Settings, Errors, Outcomes
// ===========================================

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub debounce: Duration,
    /// Width of the `## Progress` bar in cells.
    pub bar_width: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            bar_width: DEFAULT_BAR_WIDTH,
        }
    }
}

/// Errors surfaced by controller operations.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("note already exists: {path}")]
    AlreadyExists { path: PathBuf },

    #[error("invalid note name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("note not found: {name}")]
    NotFound { name: String },

    #[error("'{name}' is not a {expected} note")]
    WrongKind { name: String, expected: NoteKind },

    #[error("failed to render note template: {0}")]
    Template(#[from] minijinja::Error),
}

/// Why an operation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another update holds the lease.
    Busy,
    /// No frontmatter, or `type` is not `topic`.
    NotATopic,
    /// No frontmatter, or `type` is not `subtopic`.
    NotASubtopic,
    /// The topic's `subtopics` list is empty; its fields are left as they are.
    NoSubtopics,
}

/// Result of recomputing one topic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateOutcome {
    /// The note changed and was written.
    Written(TopicProgress),
    /// The note already matched; nothing was written.
    Unchanged(TopicProgress),
    Skipped(SkipReason),
}

impl UpdateOutcome {
    pub fn progress(&self) -> Option<TopicProgress> {
        match self {
            UpdateOutcome::Written(p) | UpdateOutcome::Unchanged(p) => Some(*p),
            UpdateOutcome::Skipped(_) => None,
        }
    }

    pub fn was_written(&self) -> bool {
        matches!(self, UpdateOutcome::Written(_))
    }
}

/// Result of toggling a subtopic.
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    Toggled {
        /// The new value of `completed`.
        completed: bool,
        /// The parent topic and what recomputing it did, if it resolved.
        parent: Option<(PathBuf, UpdateOutcome)>,
    },
    Skipped(SkipReason),
}

/// A newly created subtopic and the update of its parent, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedSubtopic {
    pub path: PathBuf,
    pub parent: Option<(PathBuf, UpdateOutcome)>,
}

/// What one pass over the pending queue did.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Paths taken from the queue, in order.
    pub processed: Vec<PathBuf>,
    /// Notes the controller rewrote.
    pub written: Vec<PathBuf>,
    /// Per-path failures; they did not stop the pass.
    pub failed: Vec<(PathBuf, SyncError)>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.processed.is_empty() && self.written.is_empty()
    }

    /// Every path the pass read or wrote, each once.
    pub fn touched(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        self.processed
            .iter()
            .chain(&self.written)
            .filter(|p| seen.insert(*p))
            .cloned()
            .collect()
    }
}

// ===========================================
// SyncController
// ===========================================

/// Keeps topic progress in step with subtopic completion.
///
/// Single-threaded: drive it from one consumer, either a command or the
/// [`run`](SyncController::run) loop.
pub struct SyncController<S: NoteStore> {
    store: S,
    settings: SyncSettings,
    gate: UpdateGate,
    pending: RefCell<PendingQueue>,
    last_written: RefCell<HashMap<PathBuf, ContentHash>>,
}

impl<S: NoteStore> SyncController<S> {
    pub fn new(store: S, settings: SyncSettings) -> Self {
        let pending = PendingQueue::new(settings.debounce);
        Self {
            store,
            settings,
            gate: UpdateGate::new(),
            pending: RefCell::new(pending),
            last_written: RefCell::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Takes the update lease, or `None` if an update is in flight.
    pub fn try_lease(&self) -> Option<UpdateLease<'_>> {
        self.gate.try_acquire()
    }

    pub fn is_updating(&self) -> bool {
        self.gate.is_busy()
    }

    /// Resolves a note name to its path.
    ///
    /// # Errors
    ///
    /// `SyncError::NotFound` when no such note exists.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, SyncError> {
        let link = parse_name(name)?;
        self.store
            .resolve(link.name())
            .ok_or_else(|| SyncError::NotFound {
                name: link.name().to_string(),
            })
    }

    // ===========================================
    // Topic Recomputation
    // ===========================================

    /// Recomputes a topic unless another update is in flight.
    ///
    /// Returns `Skipped(Busy)` without touching the note while a lease is
    /// outstanding.
    pub fn force_update_topic(&self, topic: &Path) -> Result<UpdateOutcome, SyncError> {
        let Some(lease) = self.try_lease() else {
            debug!(topic = %topic.display(), "update in flight; skipping");
            return Ok(UpdateOutcome::Skipped(SkipReason::Busy));
        };
        self.recompute_topic(&lease, topic)
    }

    /// Recomputes a topic under a lease the caller already holds.
    ///
    /// Re-reads the topic and every subtopic from disk, then rewrites
    /// `progress`, `completed_subtopics`, `total_subtopics` and the
    /// `## Progress` / `## Subtopics` sections. Writes only if the text
    /// changed.
    pub fn recompute_topic(
        &self,
        lease: &UpdateLease<'_>,
        topic: &Path,
    ) -> Result<UpdateOutcome, SyncError> {
        let text = self.store.read(topic)?;
        let Some(frontmatter) = Frontmatter::from_document(&text) else {
            return Ok(UpdateOutcome::Skipped(SkipReason::NotATopic));
        };
        self.write_topic(lease, topic, &text, &frontmatter)
    }

    /// Aggregates `frontmatter` (possibly modified in memory) and writes the
    /// resulting topic text.
    fn write_topic(
        &self,
        _lease: &UpdateLease<'_>,
        topic: &Path,
        text: &str,
        frontmatter: &Frontmatter,
    ) -> Result<UpdateOutcome, SyncError> {
        if frontmatter.kind() != Some(NoteKind::Topic) {
            return Ok(UpdateOutcome::Skipped(SkipReason::NotATopic));
        }
        let Some(snapshot) = aggregate_frontmatter(&self.store, frontmatter)? else {
            debug!(topic = %topic.display(), "no subtopics; leaving topic as is");
            return Ok(UpdateOutcome::Skipped(SkipReason::NoSubtopics));
        };

        let Some(updated) = rewrite_topic(text, frontmatter, &snapshot, self.settings.bar_width)
        else {
            return Ok(UpdateOutcome::Skipped(SkipReason::NotATopic));
        };

        let progress = snapshot.progress;
        if updated == text {
            debug!(topic = %topic.display(), "topic already up to date");
            return Ok(UpdateOutcome::Unchanged(progress));
        }

        self.write(topic, &updated)?;
        info!(
            topic = %topic.display(),
            completed = progress.completed(),
            total = progress.total(),
            "topic progress updated"
        );
        Ok(UpdateOutcome::Written(progress))
    }

    /// Writes a note and remembers the hash of what was written.
    fn write(&self, path: &Path, content: &str) -> Result<(), SyncError> {
        let hash = self.store.write(path, content)?;
        self.last_written
            .borrow_mut()
            .insert(path.to_path_buf(), hash);
        Ok(())
    }

    /// Checks `text` against the hash recorded for our last write to `path`.
    ///
    /// The record is consumed either way: it only ever describes the next
    /// observed state of the file, so a later edit back to the same bytes
    /// is treated as a user change.
    fn take_own_write(&self, path: &Path, text: &str) -> bool {
        self.last_written
            .borrow_mut()
            .remove(path)
            .is_some_and(|hash| hash == ContentHash::compute(text.as_bytes()))
    }

    // ===========================================
    // Commands
    // ===========================================

    /// Flips a subtopic's `completed` flag and recomputes its parent.
    ///
    /// On a false to true transition `completion_date` is set to `today`.
    /// Going back to false leaves the date in place.
    pub fn toggle_completion(
        &self,
        subtopic: &Path,
        today: NaiveDate,
    ) -> Result<ToggleOutcome, SyncError> {
        let Some(lease) = self.try_lease() else {
            return Ok(ToggleOutcome::Skipped(SkipReason::Busy));
        };

        let text = self.store.read(subtopic)?;
        let Some(mut frontmatter) = Frontmatter::from_document(&text) else {
            return Ok(ToggleOutcome::Skipped(SkipReason::NotASubtopic));
        };
        if frontmatter.kind() != Some(NoteKind::Subtopic) {
            return Ok(ToggleOutcome::Skipped(SkipReason::NotASubtopic));
        }

        let completed = !frontmatter.bool_field("completed").unwrap_or(false);
        frontmatter.set_bool("completed", completed);
        if completed {
            frontmatter.set_date("completion_date", today);
        }

        let Some(updated) = replace_frontmatter_block(&text, &frontmatter.render()) else {
            return Ok(ToggleOutcome::Skipped(SkipReason::NotASubtopic));
        };
        let updated = rewrite_status(&updated, completed);
        self.write(subtopic, &updated)?;
        info!(subtopic = %subtopic.display(), completed, "completion toggled");

        let parent = match self.parent_of(&frontmatter) {
            Some(parent) => {
                let outcome = self.recompute_topic(&lease, &parent)?;
                Some((parent, outcome))
            }
            None => None,
        };

        Ok(ToggleOutcome::Toggled { completed, parent })
    }

    /// Appends `[[subtopic]]` to a topic's `subtopics` and recomputes it.
    ///
    /// The list is written back as a block list. Appending a name that is
    /// already listed changes nothing but still recomputes. Everything is
    /// written in a single pass.
    pub fn add_subtopic_to_parent(
        &self,
        parent: &Path,
        subtopic: &LinkRef,
    ) -> Result<UpdateOutcome, SyncError> {
        let Some(lease) = self.try_lease() else {
            return Ok(UpdateOutcome::Skipped(SkipReason::Busy));
        };
        self.append_subtopic(&lease, parent, subtopic)
    }

    fn append_subtopic(
        &self,
        lease: &UpdateLease<'_>,
        parent: &Path,
        subtopic: &LinkRef,
    ) -> Result<UpdateOutcome, SyncError> {
        let text = self.store.read(parent)?;
        let Some(mut frontmatter) = Frontmatter::from_document(&text) else {
            return Ok(UpdateOutcome::Skipped(SkipReason::NotATopic));
        };
        if frontmatter.kind() != Some(NoteKind::Topic) {
            return Ok(UpdateOutcome::Skipped(SkipReason::NotATopic));
        }

        if frontmatter.append_list_item("subtopics", &subtopic.to_string()) {
            let total = frontmatter.count("total_subtopics").unwrap_or(0);
            frontmatter.set_count("total_subtopics", total + 1);
            debug!(parent = %parent.display(), %subtopic, "subtopic appended");
        }

        self.write_topic(lease, parent, &text, &frontmatter)
    }

    /// Creates `<name>.md` from the topic template.
    ///
    /// # Errors
    ///
    /// `SyncError::AlreadyExists` if the note exists; nothing is written.
    pub fn create_topic(&self, name: &str, today: NaiveDate) -> Result<PathBuf, SyncError> {
        let (link, path) = new_note_path(name)?;
        let content = render_topic_note(link.name(), today, self.settings.bar_width)?;
        self.create(&path, &content)?;
        info!(path = %path.display(), "topic created");
        Ok(path)
    }

    /// Creates `<name>.md` from the subtopic template, optionally under a
    /// parent topic which is then updated.
    ///
    /// The parent is resolved before anything is written.
    pub fn create_subtopic(
        &self,
        name: &str,
        parent: Option<&str>,
        today: NaiveDate,
    ) -> Result<CreatedSubtopic, SyncError> {
        let (link, path) = new_note_path(name)?;
        let parent = match parent {
            Some(parent) => {
                let parent_link = parse_name(parent)?;
                let parent_path = self.resolve(parent_link.name())?;
                self.expect_kind(&parent_path, parent_link.name(), NoteKind::Topic)?;
                Some((parent_link, parent_path))
            }
            None => None,
        };

        let content = render_subtopic_note(link.name(), parent.as_ref().map(|(l, _)| l), today)?;
        self.create(&path, &content)?;
        info!(path = %path.display(), "subtopic created");

        let parent = match parent {
            Some((_, parent_path)) => {
                let outcome = self.add_subtopic_to_parent(&parent_path, &link)?;
                Some((parent_path, outcome))
            }
            None => None,
        };

        Ok(CreatedSubtopic { path, parent })
    }

    /// Links an existing subtopic to a topic: sets the subtopic's `parent`,
    /// lists it in the topic, and recomputes the topic.
    pub fn attach(&self, subtopic: &str, topic: &str) -> Result<UpdateOutcome, SyncError> {
        let subtopic_link = parse_name(subtopic)?;
        let topic_link = parse_name(topic)?;
        let subtopic_path = self.resolve(subtopic_link.name())?;
        let topic_path = self.resolve(topic_link.name())?;
        self.expect_kind(&topic_path, topic_link.name(), NoteKind::Topic)?;

        let Some(lease) = self.try_lease() else {
            return Ok(UpdateOutcome::Skipped(SkipReason::Busy));
        };

        let text = self.store.read(&subtopic_path)?;
        let mut frontmatter = Frontmatter::from_document(&text)
            .filter(|fm| fm.kind() == Some(NoteKind::Subtopic))
            .ok_or_else(|| SyncError::WrongKind {
                name: subtopic_link.name().to_string(),
                expected: NoteKind::Subtopic,
            })?;
        frontmatter.set_scalar("parent", topic_link.quoted());
        if let Some(updated) = replace_frontmatter_block(&text, &frontmatter.render())
            && updated != text
        {
            self.write(&subtopic_path, &updated)?;
        }

        self.append_subtopic(&lease, &topic_path, &subtopic_link)
    }

    fn create(&self, path: &Path, content: &str) -> Result<(), SyncError> {
        let hash = self.store.create(path, content).map_err(|e| match e {
            FsError::AlreadyExists { path } => SyncError::AlreadyExists { path },
            e => SyncError::Fs(e),
        })?;
        self.last_written
            .borrow_mut()
            .insert(path.to_path_buf(), hash);
        Ok(())
    }

    fn expect_kind(&self, path: &Path, name: &str, expected: NoteKind) -> Result<(), SyncError> {
        let text = self.store.read(path)?;
        match Frontmatter::from_document(&text).and_then(|fm| fm.kind()) {
            Some(kind) if kind == expected => Ok(()),
            _ => Err(SyncError::WrongKind {
                name: name.to_string(),
                expected,
            }),
        }
    }

    /// Resolves the `parent` field of a subtopic, if it names an existing note.
    fn parent_of(&self, frontmatter: &Frontmatter) -> Option<PathBuf> {
        let parent = frontmatter.scalar("parent")?;
        let link = LinkRef::new(&parent).ok()?;
        let resolved = self.store.resolve(link.name());
        if resolved.is_none() {
            warn!(parent = %link, "parent topic not found");
        }
        resolved
    }

    // ===========================================
    // Pending Queue
    // ===========================================

    /// Records that a note changed and restarts the debounce deadline.
    pub fn notify_changed(&self, path: PathBuf, now: Instant) {
        self.pending.borrow_mut().push(path, now);
    }

    /// When the pending queue becomes due, if anything is queued.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.borrow().deadline()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Runs a pass if the debounce deadline has passed.
    ///
    /// A pass only starts if the lease is free; otherwise the queue is kept
    /// for the next call.
    pub fn process_due(&self, now: Instant) -> SyncReport {
        if !self.pending.borrow().is_due(now) {
            return SyncReport::default();
        }
        self.process_pending()
    }

    /// Runs a pass over everything queued, ignoring the deadline.
    pub fn process_pending(&self) -> SyncReport {
        let Some(lease) = self.try_lease() else {
            debug!(queued = self.pending_len(), "update in flight; pass deferred");
            return SyncReport::default();
        };

        let paths = self.pending.borrow_mut().take();
        let mut report = SyncReport::default();
        let mut recomputed = HashSet::new();

        for path in paths {
            if let Err(e) = self.process_path(&lease, &path, &mut recomputed, &mut report) {
                error!(path = %path.display(), error = %e, "sync failed");
                report.failed.push((path.clone(), e));
            }
            report.processed.push(path);
        }

        if !report.written.is_empty() {
            debug!(written = report.written.len(), "sync pass finished");
        }
        report
    }

    fn process_path(
        &self,
        lease: &UpdateLease<'_>,
        path: &Path,
        recomputed: &mut HashSet<PathBuf>,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let text = match self.store.read(path) {
            Ok(text) => text,
            Err(FsError::NotFound { .. }) => {
                self.last_written.borrow_mut().remove(path);
                debug!(path = %path.display(), "note gone; nothing to do");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if self.take_own_write(path, &text) {
            debug!(path = %path.display(), "own write; skipping");
            return Ok(());
        }

        let Some(frontmatter) = Frontmatter::from_document(&text) else {
            return Ok(());
        };

        let topic = match frontmatter.kind() {
            Some(NoteKind::Topic) => path.to_path_buf(),
            Some(NoteKind::Subtopic) => {
                self.resync_status(path, &text, &frontmatter, report)?;
                match self.parent_of(&frontmatter) {
                    Some(parent) => parent,
                    None => return Ok(()),
                }
            }
            None => return Ok(()),
        };

        if !recomputed.insert(topic.clone()) {
            return Ok(());
        }
        if self.recompute_topic(lease, &topic)?.was_written() {
            report.written.push(topic);
        }
        Ok(())
    }

    /// Rewrites a subtopic's `Status:` line if it disagrees with `completed`.
    fn resync_status(
        &self,
        path: &Path,
        text: &str,
        frontmatter: &Frontmatter,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let completed = frontmatter.bool_field("completed").unwrap_or(false);
        match read_status_line(text) {
            Some(line) if line != status_line(completed) => {
                self.write(path, &rewrite_status(text, completed))?;
                debug!(path = %path.display(), completed, "status line resynced");
                report.written.push(path.to_path_buf());
            }
            _ => {}
        }
        Ok(())
    }

    // ===========================================
    // Actor Loop
    // ===========================================

    /// Consumes change notifications until the sender side disconnects.
    ///
    /// Each received path is queued; once no message has arrived for the
    /// debounce period the queue is processed and `on_pass` is called with
    /// the report. Whatever is still queued at disconnect is processed
    /// before returning.
    pub fn run<F>(&self, events: &Receiver<PathBuf>, mut on_pass: F)
    where
        F: FnMut(&SyncReport),
    {
        loop {
            let received = match self.next_deadline() {
                Some(deadline) => {
                    let timeout = deadline.saturating_duration_since(Instant::now());
                    match events.recv_timeout(timeout) {
                        Ok(path) => Some(path),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match events.recv() {
                    Ok(path) => Some(path),
                    Err(_) => break,
                },
            };

            match received {
                Some(path) => self.notify_changed(path, Instant::now()),
                None => {
                    let report = self.process_due(Instant::now());
                    if !report.is_empty() {
                        on_pass(&report);
                    }
                }
            }
        }

        let report = self.process_pending();
        if !report.is_empty() {
            on_pass(&report);
        }
    }
}

fn parse_name(name: &str) -> Result<LinkRef, SyncError> {
    LinkRef::new(name).map_err(|e| SyncError::InvalidName {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// Validates a name for a new note and returns its link and relative path.
fn new_note_path(name: &str) -> Result<(LinkRef, PathBuf), SyncError> {
    let link = parse_name(name)?;
    let path = note_path(link.name()).ok_or_else(|| SyncError::InvalidName {
        name: name.to_string(),
        reason: "must be a relative path without '..'".to_string(),
    })?;
    Ok((link, path))
}
