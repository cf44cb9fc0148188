//! Handlers that create notes or link them together.

use anyhow::{Context, Result};
use std::path::Path;

use super::{describe_update, open_controller, refresh_cache, today};
use crate::cli::config::Config;
use crate::cli::{AttachArgs, NewSubtopicArgs, NewTopicArgs};

pub fn handle_new_topic(args: &NewTopicArgs, notes_dir: &Path, config: &Config) -> Result<()> {
    let controller = open_controller(notes_dir, config)?;
    let path = controller
        .create_topic(&args.name, today())
        .with_context(|| format!("failed to create topic '{}'", args.name))?;

    refresh_cache(controller.store(), std::slice::from_ref(&path));

    println!("Created topic: {}", args.name);
    println!("  {}", controller.store().full_path(&path).display());
    Ok(())
}

pub fn handle_new_subtopic(
    args: &NewSubtopicArgs,
    notes_dir: &Path,
    config: &Config,
) -> Result<()> {
    let controller = open_controller(notes_dir, config)?;
    let created = controller
        .create_subtopic(&args.name, args.parent.as_deref(), today())
        .with_context(|| format!("failed to create subtopic '{}'", args.name))?;

    let mut touched = vec![created.path.clone()];
    if let Some((parent, _)) = &created.parent {
        touched.push(parent.clone());
    }
    refresh_cache(controller.store(), &touched);

    println!("Created subtopic: {}", args.name);
    println!("  {}", controller.store().full_path(&created.path).display());
    if let Some((parent, outcome)) = &created.parent {
        println!("  {}: {}", parent.display(), describe_update(outcome));
    }
    Ok(())
}

pub fn handle_attach(args: &AttachArgs, notes_dir: &Path, config: &Config) -> Result<()> {
    let controller = open_controller(notes_dir, config)?;
    let outcome = controller
        .attach(&args.subtopic, &args.topic)
        .with_context(|| format!("failed to attach '{}' to '{}'", args.subtopic, args.topic))?;

    let touched: Vec<_> = [&args.subtopic, &args.topic]
        .into_iter()
        .filter_map(|name| controller.resolve(name).ok())
        .collect();
    refresh_cache(controller.store(), &touched);

    println!("Attached {} to {}", args.subtopic, args.topic);
    println!("  {}", describe_update(&outcome));
    Ok(())
}
