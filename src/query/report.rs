//! Markdown progress reports rendered with minijinja.

use minijinja::{Environment, context};
use serde::Serialize;

use crate::domain::{ProgressStatus, TopicProgress, percent, render_bar};
use crate::progress::DEFAULT_BAR_WIDTH;
use crate::query::{
    DEFAULT_GAP_THRESHOLD, DEFAULT_LIMIT, TopicSummary, knowledge_gaps, overall_progress,
    recommended_topics,
};

/// Template for a single topic report.
pub const TOPIC_REPORT_TEMPLATE: &str = r##"# {{ topic.name }}

{{ topic.percent }}% complete ({{ topic.completed }}/{{ topic.total }} subtopics)

```
{{ topic.bar }}
```

## Subtopics

{% for entry in entries %}- [[{{ entry.name }}]] {{ entry.glyph }}
{% else %}No subtopics yet.
{% endfor %}"##;

/// Template for the whole-vault report.
pub const VAULT_REPORT_TEMPLATE: &str = r##"# Learning progress

{{ overall.percent }}% complete ({{ overall.completed }}/{{ overall.total }} subtopics across {{ topics|length }} topics)

```
{{ overall.bar }}
```

## Topics

{% if topics %}| Topic | Progress | Status |
| --- | --- | --- |
{% for t in topics %}| [[{{ t.name }}]] | {{ t.percent }}% ({{ t.completed }}/{{ t.total }}) | {{ t.status }} |
{% endfor %}{% else %}No topics yet.
{% endif %}
## Recommended next

{% for t in recommended %}- [[{{ t.name }}]] {{ t.percent }}%
{% else %}Nothing in progress.
{% endfor %}
## Knowledge gaps

{% for t in gaps %}- [[{{ t.name }}]] {{ t.percent }}%
{% else %}No topics below {{ threshold }}%.
{% endfor %}"##;

/// Knobs for [`vault_report`] and [`topic_report`].
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub bar_width: usize,
    pub gap_threshold: f64,
    pub recommend_limit: usize,
    pub gap_limit: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            bar_width: DEFAULT_BAR_WIDTH,
            gap_threshold: DEFAULT_GAP_THRESHOLD,
            recommend_limit: DEFAULT_LIMIT,
            gap_limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Serialize)]
struct ProgressRow<'a> {
    name: &'a str,
    percent: u32,
    completed: usize,
    total: usize,
    status: &'static str,
    bar: String,
}

impl<'a> ProgressRow<'a> {
    fn new(name: &'a str, progress: &TopicProgress, bar_width: usize) -> Self {
        Self::with_ratio(name, progress, progress.ratio(), bar_width)
    }

    fn topic(topic: &'a TopicSummary, bar_width: usize) -> Self {
        Self::with_ratio(&topic.name, &topic.progress, topic.ratio(), bar_width)
    }

    fn with_ratio(name: &'a str, progress: &TopicProgress, ratio: f64, bar_width: usize) -> Self {
        Self {
            name,
            percent: percent(ratio),
            completed: progress.completed(),
            total: progress.total(),
            status: ProgressStatus::from_ratio(ratio).label(),
            bar: render_bar(ratio, bar_width),
        }
    }
}

fn summary_rows<'a>(
    topics: impl IntoIterator<Item = &'a TopicSummary>,
    bar_width: usize,
) -> Vec<ProgressRow<'a>> {
    topics
        .into_iter()
        .map(|t| ProgressRow::topic(t, bar_width))
        .collect()
}

#[derive(Serialize)]
struct EntryRow<'a> {
    name: &'a str,
    glyph: &'static str,
}

fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.add_template("topic_report.md", TOPIC_REPORT_TEMPLATE)?;
    env.add_template("vault_report.md", VAULT_REPORT_TEMPLATE)?;
    Ok(env)
}

/// Renders a report for one topic and its subtopics.
pub fn topic_report(topic: &TopicSummary, options: &ReportOptions) -> Result<String, minijinja::Error> {
    let entries: Vec<EntryRow> = topic
        .entries
        .iter()
        .map(|entry| EntryRow {
            name: &entry.name,
            glyph: entry.state.glyph(),
        })
        .collect();

    let env = environment()?;
    env.get_template("topic_report.md")?.render(context! {
        topic => ProgressRow::topic(topic, options.bar_width),
        entries => entries,
    })
}

/// Renders the overview of every topic: overall progress, a status table,
/// recommendations and knowledge gaps.
pub fn vault_report(topics: &[TopicSummary], options: &ReportOptions) -> Result<String, minijinja::Error> {
    let width = options.bar_width;
    let overall = overall_progress(topics);
    let rows = summary_rows(topics.iter(), width);
    let recommended = summary_rows(recommended_topics(topics, options.recommend_limit), width);
    let gaps = summary_rows(
        knowledge_gaps(topics, options.gap_threshold, options.gap_limit),
        width,
    );

    let env = environment()?;
    env.get_template("vault_report.md")?.render(context! {
        overall => ProgressRow::new("", &overall, options.bar_width),
        topics => rows,
        recommended => recommended,
        gaps => gaps,
        threshold => (options.gap_threshold * 100.0).round() as u32,
    })
}
