//! Topic progress: aggregation, derived body sections, note templates

mod aggregate;
mod render;
mod template;

pub use aggregate::{
    SubtopicEntry, TopicSnapshot, aggregate_frontmatter, cached_topic_progress,
    compute_topic_progress,
};
pub use render::{
    DEFAULT_BAR_WIDTH, PROGRESS_HEADING, SUBTOPICS_HEADING, progress_section, rewrite_status,
    rewrite_topic, status_line, subtopics_section,
};
pub use template::{SUBTOPIC_TEMPLATE, TOPIC_TEMPLATE, render_subtopic_note, render_topic_note};
