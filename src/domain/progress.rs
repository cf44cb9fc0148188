//! Completion ratios and the glyphs used to display them.

use serde::Serialize;

/// Glyph for a filled bar cell.
pub const BAR_FILLED: char = '█';
/// Glyph for an empty bar cell.
pub const BAR_EMPTY: char = '░';

/// Completed/total counts for one topic.
///
/// # Examples
///
/// ```
/// use trail::domain::TopicProgress;
///
/// let progress = TopicProgress::new(2, 3);
/// assert_eq!(progress.rounded(), 0.67);
/// assert_eq!(progress.percent(), 67);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TopicProgress {
    completed: usize,
    total: usize,
}

impl TopicProgress {
    pub fn new(completed: usize, total: usize) -> Self {
        Self {
            completed: completed.min(total),
            total,
        }
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns `completed / total`, or 0 for an empty topic.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }

    /// Returns the ratio rounded to two decimals, as stored in frontmatter.
    pub fn rounded(&self) -> f64 {
        round_ratio(self.ratio())
    }

    /// Returns the ratio as a whole percentage.
    pub fn percent(&self) -> u32 {
        percent(self.ratio())
    }

    pub fn status(&self) -> ProgressStatus {
        ProgressStatus::from_ratio(self.ratio())
    }
}

/// Rounds a ratio to two decimals.
pub fn round_ratio(ratio: f64) -> f64 {
    (ratio * 100.0).round() / 100.0
}

/// Converts a ratio in `[0, 1]` to a whole percentage.
pub fn percent(ratio: f64) -> u32 {
    (ratio.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Formats a ratio the way it is written to frontmatter (`0.67`, `0.5`, `1`).
pub fn format_ratio(ratio: f64) -> String {
    format!("{}", round_ratio(ratio))
}

/// Renders a fixed-width glyph bar for a ratio.
///
/// ```
/// use trail::domain::render_bar;
///
/// assert_eq!(render_bar(0.5, 4), "██░░");
/// ```
pub fn render_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    let mut bar = String::with_capacity(width * BAR_FILLED.len_utf8());
    bar.extend(std::iter::repeat_n(BAR_FILLED, filled));
    bar.extend(std::iter::repeat_n(BAR_EMPTY, width - filled));
    bar
}

/// Coarse bucket a topic falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio <= 0.0 {
            ProgressStatus::NotStarted
        } else if ratio >= 1.0 {
            ProgressStatus::Completed
        } else {
            ProgressStatus::InProgress
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "Not started",
            ProgressStatus::InProgress => "In progress",
            ProgressStatus::Completed => "Completed",
        }
    }
}

/// Completion state of one `subtopics` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtopicState {
    Completed,
    Incomplete,
    /// The entry does not resolve to an existing note.
    Missing,
}

impl SubtopicState {
    pub fn glyph(&self) -> &'static str {
        match self {
            SubtopicState::Completed => "✅",
            SubtopicState::Incomplete => "❌",
            SubtopicState::Missing => "❓",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, SubtopicState::Completed)
    }
}
