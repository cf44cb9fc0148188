//! trail - learning progress tracking for Markdown topic notes

pub mod cli;
pub mod domain;
pub mod index;
pub mod infra;
pub mod progress;
pub mod query;
pub mod sync;
pub mod watch;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use cli::{
    Cli, Command,
    config::Config,
    handlers::{
        handle_attach, handle_gaps, handle_index, handle_new_subtopic, handle_new_topic,
        handle_recommend, handle_report, handle_status, handle_toggle, handle_update,
        handle_watch,
    },
};

/// Main entry point for the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;
    let notes_dir = config.notes_dir(cli.dir.as_ref());
    let verbose = cli.verbose > 0;

    match &cli.command {
        Command::NewTopic(args) => handle_new_topic(args, &notes_dir, &config),
        Command::NewSubtopic(args) => handle_new_subtopic(args, &notes_dir, &config),
        Command::Attach(args) => handle_attach(args, &notes_dir, &config),
        Command::Toggle(args) => handle_toggle(args, &notes_dir, &config),
        Command::Update(args) => handle_update(args, &notes_dir, &config),
        Command::Status(args) => handle_status(args, &notes_dir, &config),
        Command::Recommend(args) => handle_recommend(args, &notes_dir, &config),
        Command::Gaps(args) => handle_gaps(args, &notes_dir, &config),
        Command::Report(args) => handle_report(args, &notes_dir, &config),
        Command::Index(args) => handle_index(args, &notes_dir, verbose),
        Command::Watch(args) => handle_watch(args, &notes_dir, &config),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(args.shell, &mut command, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Logs to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("trail={level}")));
    // Only fails if a subscriber is already set.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
