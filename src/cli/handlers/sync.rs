//! Toggle and update command handlers.

use anyhow::{Context, Result, bail};
use std::path::Path;

use super::{describe_skip, describe_update, open_controller, refresh_cache, today};
use crate::cli::config::Config;
use crate::cli::{ToggleArgs, UpdateArgs};
use crate::domain::NoteKind;
use crate::infra::{Frontmatter, NoteStore};
use crate::sync::ToggleOutcome;

pub fn handle_toggle(args: &ToggleArgs, notes_dir: &Path, config: &Config) -> Result<()> {
    let controller = open_controller(notes_dir, config)?;
    let path = controller.resolve(&args.subtopic)?;

    let outcome = controller
        .toggle_completion(&path, today())
        .with_context(|| format!("failed to toggle '{}'", args.subtopic))?;

    match outcome {
        ToggleOutcome::Toggled { completed, parent } => {
            let mut touched = vec![path];
            let state = if completed { "completed" } else { "not completed" };
            println!("{}: {}", args.subtopic, state);
            if let Some((parent, outcome)) = parent {
                println!("  {}: {}", parent.display(), describe_update(&outcome));
                touched.push(parent);
            }
            refresh_cache(controller.store(), &touched);
        }
        ToggleOutcome::Skipped(reason) => {
            bail!("cannot toggle '{}': {}", args.subtopic, describe_skip(reason));
        }
    }
    Ok(())
}

pub fn handle_update(args: &UpdateArgs, notes_dir: &Path, config: &Config) -> Result<()> {
    let controller = open_controller(notes_dir, config)?;

    let topics = match &args.topic {
        Some(name) => vec![controller.resolve(name)?],
        None => {
            let mut topics = Vec::new();
            for path in controller.store().list_notes()? {
                let Ok(text) = controller.store().read(&path) else {
                    continue;
                };
                if Frontmatter::from_document(&text).is_some_and(|fm| fm.kind() == Some(NoteKind::Topic)) {
                    topics.push(path);
                }
            }
            topics
        }
    };

    let mut written = Vec::new();
    for topic in &topics {
        let outcome = controller
            .force_update_topic(topic)
            .with_context(|| format!("failed to update {}", topic.display()))?;
        println!("{}: {}", topic.display(), describe_update(&outcome));
        if outcome.was_written() {
            written.push(topic.clone());
        }
    }

    if args.all && topics.is_empty() {
        println!("No topics found.");
    }
    refresh_cache(controller.store(), &written);
    Ok(())
}
