//! Command handlers for the CLI.

mod create;
mod index;
mod query;
mod report;
mod sync;
mod watch;


use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::cli::config::Config;
use crate::index::{FileResult, IndexBuilder, ProgressReporter, SqliteIndex};
use crate::infra::FsNoteStore;
use crate::sync::{SkipReason, SyncController, UpdateOutcome};

pub use create::{handle_attach, handle_new_subtopic, handle_new_topic};
pub use index::handle_index;
pub use query::{handle_gaps, handle_recommend, handle_status};
pub use report::handle_report;
pub use sync::{handle_toggle, handle_update};
pub use watch::handle_watch;

// ===========================================
// Shared Utilities
// ===========================================

/// Progress reporter that prints to stdout.
pub(crate) struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub(crate) fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleReporter {
    fn on_file(&mut self, path: &Path, result: FileResult) {
        if self.verbose {
            match result {
                FileResult::Indexed => println!("  indexed: {}", path.display()),
                FileResult::Skipped => println!("  skipped: {}", path.display()),
                FileResult::Error(msg) => eprintln!("  error: {}: {}", path.display(), msg),
            }
        }
    }

    fn on_complete(&mut self, indexed: usize, errors: usize) {
        if errors > 0 {
            eprintln!("Indexed {} notes with {} errors", indexed, errors);
        } else {
            println!("Indexed {} notes", indexed);
        }
    }
}

/// Opens the vault, failing if the directory does not exist.
pub(crate) fn open_store(notes_dir: &Path) -> Result<FsNoteStore> {
    if !notes_dir.exists() {
        bail!("vault directory does not exist: {}", notes_dir.display());
    }
    FsNoteStore::open(notes_dir)
        .with_context(|| format!("failed to open vault at {}", notes_dir.display()))
}

pub(crate) fn open_controller(notes_dir: &Path, config: &Config) -> Result<SyncController<FsNoteStore>> {
    let store = open_store(notes_dir)?;
    Ok(SyncController::new(store, config.sync_settings()))
}

/// Opens the vault's metadata cache and brings it up to date.
pub(crate) fn open_cache(store: &FsNoteStore) -> Result<SqliteIndex> {
    let db_path = SqliteIndex::vault_db_path(store.root());
    let mut index = SqliteIndex::open(&db_path)
        .with_context(|| format!("failed to open cache at {}", db_path.display()))?;
    let result = IndexBuilder::new(store)
        .incremental_update(&mut index)
        .with_context(|| "failed to update cache")?;
    for error in &result.errors {
        warn!(%error, "note not cached");
    }
    Ok(index)
}

/// Re-reads changed notes into the cache, if one exists.
///
/// Failures only warn; the notes themselves were written successfully.
pub(crate) fn refresh_cache(store: &FsNoteStore, paths: &[PathBuf]) {
    let db_path = SqliteIndex::vault_db_path(store.root());
    if !db_path.exists() {
        return;
    }
    let refreshed = SqliteIndex::open(&db_path)
        .and_then(|mut index| IndexBuilder::new(store).refresh_paths(&mut index, paths));
    if let Err(e) = refreshed {
        warn!(error = %e, "failed to refresh cache");
    }
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// One-line description of what an update did to a topic.
pub(crate) fn describe_update(outcome: &UpdateOutcome) -> String {
    match outcome {
        UpdateOutcome::Written(p) => format!(
            "updated: {}% ({}/{})",
            p.percent(),
            p.completed(),
            p.total()
        ),
        UpdateOutcome::Unchanged(p) => format!(
            "up to date: {}% ({}/{})",
            p.percent(),
            p.completed(),
            p.total()
        ),
        UpdateOutcome::Skipped(reason) => format!("skipped: {}", describe_skip(*reason)),
    }
}

pub(crate) fn describe_skip(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::Busy => "another update is in progress",
        SkipReason::NotATopic => "not a topic note",
        SkipReason::NotASubtopic => "not a subtopic note",
        SkipReason::NoSubtopics => "no subtopics listed",
    }
}
