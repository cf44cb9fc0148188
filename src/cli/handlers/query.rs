//! Status, recommend, and gaps command handlers.

use anyhow::{Context, Result, anyhow};
use std::path::Path;

use super::{open_cache, open_store};
use crate::cli::config::Config;
use crate::cli::output::{OutputFormat, Output, OverallListing, TopicDetail, TopicListing};
use crate::cli::{GapsArgs, RecommendArgs, StatusArgs};
use crate::domain::render_bar;
use crate::infra::FsNoteStore;
use crate::query::{
    TopicSummary, knowledge_gaps, load_topics, load_topics_fresh, overall_progress,
    recommended_topics, topics_by_status,
};

/// Loads all topics, from the cache unless `fresh` asks for a disk read.
pub(crate) fn load(store: &FsNoteStore, fresh: bool) -> Result<Vec<TopicSummary>> {
    if fresh {
        return load_topics_fresh(store).with_context(|| "failed to read topics");
    }
    let index = open_cache(store)?;
    load_topics(&index).with_context(|| "failed to load topics from cache")
}

/// Picks one topic by name out of a loaded list.
pub(crate) fn find_topic<'a>(topics: &'a [TopicSummary], name: &str) -> Result<&'a TopicSummary> {
    let name = crate::domain::extract_link_text(name).trim();
    topics
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| anyhow!("topic not found: {}", name))
}

pub fn handle_status(args: &StatusArgs, notes_dir: &Path, config: &Config) -> Result<()> {
    let store = open_store(notes_dir)?;
    let topics = load(&store, args.fresh)?;
    let bar_width = config.report_options().bar_width;

    if let Some(name) = &args.topic {
        let topic = find_topic(&topics, name)?;
        match args.format {
            OutputFormat::Human => {
                println!("{}", topic.name);
                println!(
                    "  {} {}% ({}/{})",
                    render_bar(topic.ratio(), bar_width),
                    topic.percent(),
                    topic.progress.completed(),
                    topic.progress.total()
                );
                for entry in &topic.entries {
                    println!("  {} {}", entry.state.glyph(), entry.name);
                }
            }
            OutputFormat::Json => {
                let output = Output::new(TopicDetail::from(topic));
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
        return Ok(());
    }

    let overall = overall_progress(&topics);
    match args.format {
        OutputFormat::Human => {
            if topics.is_empty() {
                println!("No topics found.");
                return Ok(());
            }
            println!(
                "Overall: {} {}% ({}/{} subtopics)",
                render_bar(overall.ratio(), bar_width),
                overall.percent(),
                overall.completed(),
                overall.total()
            );

            let groups = topics_by_status(&topics);
            for (label, group) in [
                ("In progress", &groups.in_progress),
                ("Not started", &groups.not_started),
                ("Completed", &groups.completed),
            ] {
                if group.is_empty() {
                    continue;
                }
                println!();
                println!("{} ({})", label, group.len());
                for topic in group {
                    print_topic_line(topic);
                }
            }
        }
        OutputFormat::Json => {
            let output = Output::new(OverallListing::new(overall, &topics));
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

pub fn handle_recommend(args: &RecommendArgs, notes_dir: &Path, config: &Config) -> Result<()> {
    let store = open_store(notes_dir)?;
    let topics = load(&store, false)?;
    let limit = args.limit.unwrap_or(config.report_options().recommend_limit);

    let picked = recommended_topics(&topics, limit);
    print_topics(&picked, args.format, "No topics in progress.")
}

pub fn handle_gaps(args: &GapsArgs, notes_dir: &Path, config: &Config) -> Result<()> {
    let options = config.report_options();
    let threshold = args.threshold.unwrap_or(options.gap_threshold);
    if !(0.0..=1.0).contains(&threshold) {
        anyhow::bail!("threshold must be between 0 and 1, got {}", threshold);
    }

    let store = open_store(notes_dir)?;
    let topics = load(&store, false)?;
    let limit = args.limit.unwrap_or(options.gap_limit);

    let picked = knowledge_gaps(&topics, threshold, limit);
    print_topics(&picked, args.format, "No knowledge gaps.")
}

fn print_topics(topics: &[&TopicSummary], format: OutputFormat, empty: &str) -> Result<()> {
    match format {
        OutputFormat::Human => {
            if topics.is_empty() {
                println!("{}", empty);
            }
            for topic in topics {
                print_topic_line(topic);
            }
        }
        OutputFormat::Json => {
            let listings: Vec<TopicListing> = topics.iter().map(|t| TopicListing::from(*t)).collect();
            println!("{}", serde_json::to_string_pretty(&Output::new(listings))?);
        }
    }
    Ok(())
}

fn print_topic_line(topic: &TopicSummary) {
    println!(
        "  {:>3}%  {:<40}  {}/{}",
        topic.percent(),
        topic.name,
        topic.progress.completed(),
        topic.progress.total()
    );
}
