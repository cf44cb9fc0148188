//! Derived body text: the `## Progress` and `## Subtopics` sections and the
//! subtopic `Status:` line.

use crate::domain::{TopicProgress, render_bar};
use crate::infra::{Frontmatter, replace_frontmatter_block, replace_section, replace_status_line};
use crate::progress::aggregate::{SubtopicEntry, TopicSnapshot};

pub const PROGRESS_HEADING: &str = "Progress";
pub const SUBTOPICS_HEADING: &str = "Subtopics";

/// Default width of the glyph bar, in cells.
pub const DEFAULT_BAR_WIDTH: usize = 20;

/// Body of the `## Progress` section: a percentage line and a fenced bar.
pub fn progress_section(progress: &TopicProgress, bar_width: usize) -> String {
    format!(
        "{}% complete\n\n```\n{}\n```\n",
        progress.percent(),
        render_bar(progress.ratio(), bar_width)
    )
}

/// Body of the `## Subtopics` section, one line per entry in list order.
pub fn subtopics_section(entries: &[SubtopicEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("- [[{}]] {}\n", entry.name, entry.state.glyph()))
        .collect()
}

pub fn status_line(completed: bool) -> &'static str {
    if completed {
        "Status: ✅ Completed"
    } else {
        "Status: ❌ Not completed"
    }
}

/// Writes a snapshot into a topic document.
///
/// Updates the derived frontmatter fields, then the `## Progress` and
/// `## Subtopics` sections when present. Sections that are absent are left
/// alone.
pub fn rewrite_topic(
    text: &str,
    frontmatter: &Frontmatter,
    snapshot: &TopicSnapshot,
    bar_width: usize,
) -> Option<String> {
    let mut frontmatter = frontmatter.clone();
    frontmatter.set_number("progress", snapshot.progress.ratio());
    frontmatter.set_count("completed_subtopics", snapshot.progress.completed());
    frontmatter.set_count("total_subtopics", snapshot.progress.total());

    let mut text = replace_frontmatter_block(text, &frontmatter.render())?;
    if let Some(updated) = replace_section(
        &text,
        PROGRESS_HEADING,
        &progress_section(&snapshot.progress, bar_width),
    ) {
        text = updated;
    }
    if let Some(updated) = replace_section(
        &text,
        SUBTOPICS_HEADING,
        &subtopics_section(&snapshot.entries),
    ) {
        text = updated;
    }
    Some(text)
}

/// Rewrites the `Status:` line of a subtopic body to match `completed`.
///
/// Returns the text unchanged when there is no status line.
pub fn rewrite_status(text: &str, completed: bool) -> String {
    replace_status_line(text, status_line(completed)).unwrap_or_else(|| text.to_string())
}
