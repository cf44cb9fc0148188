//! Index command handler.

use anyhow::{Context, Result};
use std::path::Path;

use super::{ConsoleReporter, open_store};
use crate::cli::IndexArgs;
use crate::index::{IndexBuilder, SqliteIndex};

pub fn handle_index(args: &IndexArgs, notes_dir: &Path, verbose: bool) -> Result<()> {
    let store = open_store(notes_dir)?;
    let db_path = SqliteIndex::vault_db_path(store.root());
    let mut index = SqliteIndex::open(&db_path)
        .with_context(|| format!("failed to open cache at {}", db_path.display()))?;

    let builder = IndexBuilder::new(&store);
    let mut reporter = ConsoleReporter::new(verbose);

    if args.full {
        println!("Rebuilding cache...");
        let result = builder
            .full_rebuild_with_progress(&mut index, &mut reporter)
            .with_context(|| "failed to rebuild cache")?;

        for error in &result.errors {
            eprintln!("  {}", error);
        }
    } else {
        println!("Updating cache...");
        let result = builder
            .incremental_update_with_progress(&mut index, &mut reporter)
            .with_context(|| "failed to update cache")?;

        if verbose && (result.added > 0 || result.modified > 0 || result.removed > 0) {
            println!(
                "  {} added, {} modified, {} removed",
                result.added, result.modified, result.removed
            );
        }

        for error in &result.errors {
            eprintln!("  {}", error);
        }
    }

    Ok(())
}
