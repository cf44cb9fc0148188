//! Markdown templates for newly created topic and subtopic notes.

use chrono::NaiveDate;
use minijinja::{Environment, context};

use crate::domain::{LinkRef, TopicProgress};
use crate::progress::render::{progress_section, status_line};

/// Template for a new topic note.
pub const TOPIC_TEMPLATE: &str = r##"---
type: topic
progress: 0
subtopics: []
total_subtopics: 0
completed_subtopics: 0
created: {{ created }}
---
# {{ title }}

## Progress
{{ progress }}
## Subtopics

## Notes

"##;

/// Template for a new subtopic note.
pub const SUBTOPIC_TEMPLATE: &str = r##"---
type: subtopic
{% if parent %}parent: {{ parent }}
{% endif %}completed: false
created: {{ created }}
---
# {{ title }}

{{ status }}

## Notes

"##;

fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.add_template("topic.md", TOPIC_TEMPLATE)?;
    env.add_template("subtopic.md", SUBTOPIC_TEMPLATE)?;
    Ok(env)
}

/// Last path segment of a note name, used as the document title.
fn title(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Renders the initial content of a topic note named `name`.
pub fn render_topic_note(
    name: &str,
    created: NaiveDate,
    bar_width: usize,
) -> Result<String, minijinja::Error> {
    let env = environment()?;
    env.get_template("topic.md")?.render(context! {
        title => title(name),
        created => created.format("%Y-%m-%d").to_string(),
        progress => progress_section(&TopicProgress::new(0, 0), bar_width),
    })
}

/// Renders the initial content of a subtopic note named `name`.
///
/// `parent`, when given, is written as a quoted link in the frontmatter.
pub fn render_subtopic_note(
    name: &str,
    parent: Option<&LinkRef>,
    created: NaiveDate,
) -> Result<String, minijinja::Error> {
    let env = environment()?;
    env.get_template("subtopic.md")?.render(context! {
        title => title(name),
        parent => parent.map(LinkRef::quoted),
        created => created.format("%Y-%m-%d").to_string(),
        status => status_line(false),
    })
}
