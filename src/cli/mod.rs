//! CLI command definitions and handlers

pub mod config;
pub mod handlers;
pub mod output;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use output::OutputFormat;

/// trail - learning progress tracking for Markdown topic notes
#[derive(Parser, Debug)]
#[command(name = "trail", version, about, long_about = None)]
pub struct Cli {
    /// Vault directory (overrides config file)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new topic note
    NewTopic(NewTopicArgs),

    /// Create a new subtopic note, optionally under a topic
    NewSubtopic(NewSubtopicArgs),

    /// Link an existing subtopic to a topic
    Attach(AttachArgs),

    /// Toggle a subtopic's completion
    Toggle(ToggleArgs),

    /// Recompute progress of one or all topics
    Update(UpdateArgs),

    /// Show overall or per-topic progress
    Status(StatusArgs),

    /// Suggest in-progress topics to continue
    Recommend(RecommendArgs),

    /// List topics with little progress
    Gaps(GapsArgs),

    /// Write a Markdown progress report
    Report(ReportArgs),

    /// Rebuild or update the metadata cache
    Index(IndexArgs),

    /// Keep topics up to date while notes change
    Watch(WatchArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `new-topic` command
#[derive(Parser, Debug)]
pub struct NewTopicArgs {
    /// Topic name; the note is created as `<name>.md`
    pub name: String,
}

/// Arguments for the `new-subtopic` command
#[derive(Parser, Debug)]
pub struct NewSubtopicArgs {
    /// Subtopic name; the note is created as `<name>.md`
    pub name: String,

    /// Topic to add the subtopic to
    #[arg(short, long)]
    pub parent: Option<String>,
}

/// Arguments for the `attach` command
#[derive(Parser, Debug)]
pub struct AttachArgs {
    /// Existing subtopic
    pub subtopic: String,

    /// Topic to list it under
    pub topic: String,
}

/// Arguments for the `toggle` command
#[derive(Parser, Debug)]
pub struct ToggleArgs {
    /// Subtopic to mark completed or not completed
    pub subtopic: String,
}

/// Arguments for the `update` command
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Topic to recompute. Required unless --all is used.
    #[arg(required_unless_present = "all")]
    pub topic: Option<String>,

    /// Recompute every topic in the vault
    #[arg(long, conflicts_with = "topic")]
    pub all: bool,
}

/// Arguments for the `status` command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Show a single topic instead of the whole vault
    pub topic: Option<String>,

    /// Read notes from disk instead of the metadata cache
    #[arg(long)]
    pub fresh: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `recommend` command
#[derive(Parser, Debug)]
pub struct RecommendArgs {
    /// Maximum number of topics (default from config, else 5)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `gaps` command
#[derive(Parser, Debug)]
pub struct GapsArgs {
    /// Progress below which a topic is a gap, 0 to 1 (default from config, else 0.3)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Maximum number of topics (default from config, else 5)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `report` command
#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// Report on a single topic instead of the whole vault
    pub topic: Option<String>,

    /// Output path (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `index` command
#[derive(Parser, Debug)]
pub struct IndexArgs {
    /// Force full rebuild instead of incremental update
    #[arg(long)]
    pub full: bool,
}

/// Arguments for the `watch` command
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Quiet period before a batch of changes is processed, in milliseconds
    #[arg(long)]
    pub debounce_ms: Option<u64>,
}

/// Arguments for the `completions` command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, zsh, fish)
    #[arg(value_enum)]
    pub shell: Shell,
}
