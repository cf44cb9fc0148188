//! Reading and replacing derived sections of a note body.
//!
//! A section runs from its `## Heading` line up to the next `##`-or-deeper
//! ATX heading, or the end of the text. Headings inside fenced code blocks do
//! not count.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// Byte offsets of every ATX heading of level two or deeper, with its text.
fn subsection_headings(text: &str) -> Vec<(usize, String)> {
    let mut headings = Vec::new();
    for (event, range) in Parser::new(text).into_offset_iter() {
        let Event::Start(Tag::Heading(level, _, _)) = event else {
            continue;
        };
        if level == HeadingLevel::H1 {
            continue;
        }
        let start = line_start(text, range.start);
        let line = text[start..].lines().next().unwrap_or("");
        // Setext headings (`Title` over `---`) are not section markers.
        if !line.trim_start().starts_with("##") {
            continue;
        }
        let title = line
            .trim()
            .trim_start_matches('#')
            .trim_end_matches('#')
            .trim()
            .to_string();
        headings.push((start, title));
    }
    headings
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

fn section_range(text: &str, heading: &str) -> Option<Range<usize>> {
    let headings = subsection_headings(text);
    let index = headings.iter().position(|(_, title)| title == heading)?;
    let start = headings[index].0;
    let end = headings
        .get(index + 1)
        .map(|(offset, _)| *offset)
        .unwrap_or(text.len());
    Some(start..end)
}

/// Returns the text of the `## <heading>` section, heading line included.
pub fn read_section<'a>(text: &'a str, heading: &str) -> Option<&'a str> {
    section_range(text, heading).map(|range| &text[range])
}

/// Replaces the `## <heading>` section with `content`.
///
/// The heading line is re-emitted as `## <heading>`; a blank line separates
/// the section from a following heading. Returns `None` when the section is
/// absent.
pub fn replace_section(text: &str, heading: &str, content: &str) -> Option<String> {
    let range = section_range(text, heading)?;

    let mut section = format!("## {}\n{}", heading, content);
    if !section.ends_with('\n') {
        section.push('\n');
    }
    if range.end < text.len() {
        section.push('\n');
    }

    let mut out = String::with_capacity(text.len() + section.len());
    out.push_str(&text[..range.start]);
    out.push_str(&section);
    out.push_str(&text[range.end..]);
    Some(out)
}

fn status_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^Status:[^\r\n]*").expect("valid status pattern"))
}

/// Replaces the first `Status: ...` line with `status`.
///
/// Returns `None` when there is no status line.
pub fn replace_status_line(text: &str, status: &str) -> Option<String> {
    let found = status_pattern().find(text)?;
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..found.start()]);
    out.push_str(status);
    out.push_str(&text[found.end()..]);
    Some(out)
}

/// Returns the first `Status: ...` line, if any.
pub fn read_status_line(text: &str) -> Option<&str> {
    status_pattern().find(text).map(|m| m.as_str())
}
