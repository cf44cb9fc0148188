//! Filesystem notifications feeding the sync controller.
//!
//! The watcher callback runs on notify's own thread. It only filters events
//! and forwards vault-relative note paths into a channel; everything else
//! happens on the consumer side in [`SyncController::run`].
//!
//! [`SyncController::run`]: crate::sync::SyncController::run

use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::Sender;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

/// Starts watching `root` recursively, sending changed note paths to `events`.
///
/// Paths are relative to `root`. Dropping the returned watcher stops the
/// notifications and, once the last sender is gone, disconnects the channel.
pub fn watch_vault(root: &Path, events: Sender<PathBuf>) -> notify::Result<RecommendedWatcher> {
    let root = root.to_path_buf();
    let watch_root = root.clone();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            for path in note_paths(&root, &event) {
                debug!(path = %path.display(), kind = ?event.kind, "note changed");
                if events.send(path).is_err() {
                    // Consumer has shut down.
                    return;
                }
            }
        }
        Err(e) => warn!(error = %e, "watch error"),
    })?;

    watcher.watch(&watch_root, RecursiveMode::Recursive)?;
    Ok(watcher)
}

/// Vault-relative Markdown paths an event touches.
///
/// Access events, non-Markdown files, paths outside `root`, and anything
/// under a hidden directory (including the `.trail` cache) are dropped.
pub fn note_paths(root: &Path, event: &Event) -> Vec<PathBuf> {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return Vec::new();
    }

    event
        .paths
        .iter()
        .filter_map(|path| path.strip_prefix(root).ok())
        .filter(|relative| is_visible_note(relative))
        .map(Path::to_path_buf)
        .collect()
}

fn is_visible_note(relative: &Path) -> bool {
    let is_markdown = relative.extension().is_some_and(|ext| ext == "md");
    let hidden = relative.components().any(|c| match c {
        Component::Normal(part) => part.to_str().is_none_or(|s| s.starts_with('.')),
        _ => true,
    });
    is_markdown && !hidden
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};
    use pretty_assertions::assert_eq;
    use std::sync::mpsc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        let mut event = Event::new(kind);
        for path in paths {
            event = event.add_path(PathBuf::from(path));
        }
        event
    }

    #[test]
    fn forwards_markdown_changes_relative_to_root() {
        let root = Path::new("/vault");
        let modified = event(
            EventKind::Modify(ModifyKind::Any),
            &["/vault/Rust.md", "/vault/sub/Ownership.md"],
        );

        assert_eq!(
            note_paths(root, &modified),
            vec![PathBuf::from("Rust.md"), PathBuf::from("sub/Ownership.md")]
        );
        assert_eq!(
            note_paths(root, &event(EventKind::Remove(RemoveKind::File), &["/vault/A.md"])),
            vec![PathBuf::from("A.md")]
        );
    }

    #[test]
    fn drops_irrelevant_events_and_paths() {
        let root = Path::new("/vault");

        let access = event(EventKind::Access(AccessKind::Any), &["/vault/A.md"]);
        assert!(note_paths(root, &access).is_empty());

        let noise = event(
            EventKind::Create(CreateKind::File),
            &[
                "/vault/image.png",
                "/vault/.trail/cache.db",
                "/vault/.obsidian/notes.md",
                "/vault/.tmpXYZ.md",
                "/elsewhere/A.md",
            ],
        );
        assert!(note_paths(root, &noise).is_empty());
    }

    #[test]
    fn watcher_reports_written_notes() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let (tx, rx) = mpsc::channel();

        let _watcher = watch_vault(&root, tx).unwrap();
        std::fs::write(root.join("Rust.md"), "# Rust\n").unwrap();

        let path = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(path, PathBuf::from("Rust.md"));
    }
}
