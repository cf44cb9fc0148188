//! Watch command handler.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;
use tracing::{error, info};

use super::{open_cache, open_store};
use crate::cli::WatchArgs;
use crate::cli::config::Config;
use crate::index::IndexBuilder;
use crate::sync::SyncController;
use crate::watch::watch_vault;

/// Runs the controller against filesystem notifications until interrupted.
///
/// After every pass the touched notes are re-read into the metadata cache.
pub fn handle_watch(args: &WatchArgs, notes_dir: &Path, config: &Config) -> Result<()> {
    let store = open_store(notes_dir)?;
    let mut settings = config.sync_settings();
    if let Some(ms) = args.debounce_ms {
        settings.debounce = Duration::from_millis(ms);
    }

    let mut index = open_cache(&store)?;
    let root = store.root().to_path_buf();

    let (tx, rx) = mpsc::channel();
    let _watcher = watch_vault(&root, tx)
        .with_context(|| format!("failed to watch {}", root.display()))?;

    println!("Watching {} (Ctrl-C to stop)", root.display());
    info!(root = %root.display(), debounce_ms = settings.debounce.as_millis() as u64, "watch started");

    let controller = SyncController::new(store, settings);
    controller.run(&rx, |report| {
        for path in &report.written {
            println!("updated: {}", path.display());
        }
        for (path, e) in &report.failed {
            eprintln!("  error: {}: {}", path.display(), e);
        }
        if let Err(e) = IndexBuilder::new(controller.store()).refresh_paths(&mut index, &report.touched()) {
            error!(error = %e, "failed to refresh cache");
        }
    });

    Ok(())
}
