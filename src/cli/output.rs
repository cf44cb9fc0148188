//! Output format types for CLI commands.

use clap::ValueEnum;
use serde::Serialize;

use crate::domain::TopicProgress;
use crate::query::TopicSummary;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for programmatic consumption
    Json,
}

/// Wrapper for serializable command output.
#[derive(Debug, Serialize)]
pub struct Output<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> Output<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// A topic in listing output.
#[derive(Debug, Serialize)]
pub struct TopicListing {
    pub name: String,
    pub path: String,
    pub completed: usize,
    pub total: usize,
    pub progress: f64,
    pub status: &'static str,
}

impl From<&TopicSummary> for TopicListing {
    fn from(topic: &TopicSummary) -> Self {
        Self {
            name: topic.name.clone(),
            path: topic.path.to_string_lossy().to_string(),
            completed: topic.progress.completed(),
            total: topic.progress.total(),
            progress: topic.rounded(),
            status: topic.status().label(),
        }
    }
}

/// Vault-wide totals.
#[derive(Debug, Serialize)]
pub struct OverallListing {
    pub completed: usize,
    pub total: usize,
    pub progress: f64,
    pub topics: Vec<TopicListing>,
}

impl OverallListing {
    pub fn new(overall: TopicProgress, topics: &[TopicSummary]) -> Self {
        Self {
            completed: overall.completed(),
            total: overall.total(),
            progress: overall.rounded(),
            topics: topics.iter().map(TopicListing::from).collect(),
        }
    }
}

/// One subtopic of a topic in listing output.
#[derive(Debug, Serialize)]
pub struct SubtopicListing {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub state: crate::domain::SubtopicState,
}

/// A single topic with its subtopics.
#[derive(Debug, Serialize)]
pub struct TopicDetail {
    #[serde(flatten)]
    pub topic: TopicListing,
    pub subtopics: Vec<SubtopicListing>,
}

impl From<&TopicSummary> for TopicDetail {
    fn from(topic: &TopicSummary) -> Self {
        Self {
            topic: TopicListing::from(topic),
            subtopics: topic
                .entries
                .iter()
                .map(|entry| SubtopicListing {
                    name: entry.name.clone(),
                    path: entry
                        .path
                        .as_ref()
                        .map(|p| p.to_string_lossy().to_string()),
                    state: entry.state,
                })
                .collect(),
        }
    }
}
