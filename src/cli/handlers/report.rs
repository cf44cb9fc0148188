//! Report command handler.

use anyhow::{Context, Result};
use std::path::Path;

use super::open_store;
use super::query::{find_topic, load};
use crate::cli::ReportArgs;
use crate::cli::config::Config;
use crate::query::{topic_report, vault_report};

pub fn handle_report(args: &ReportArgs, notes_dir: &Path, config: &Config) -> Result<()> {
    let store = open_store(notes_dir)?;
    let topics = load(&store, false)?;
    let options = config.report_options();

    let report = match &args.topic {
        Some(name) => topic_report(find_topic(&topics, name)?, &options),
        None => vault_report(&topics, &options),
    }
    .with_context(|| "failed to render report")?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &report)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            println!("Wrote report to {}", path.display());
        }
        None => print!("{}", report),
    }
    Ok(())
}
