//! Note kinds recognised from the `type` frontmatter field.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The role a note plays in the progress hierarchy.
///
/// Only notes whose `type` field is exactly `topic` or `subtopic` are acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    /// A learning unit that aggregates its subtopics.
    Topic,
    /// A leaf learning unit with a `completed` flag.
    Subtopic,
}

/// Error returned when a `type` value is not a known note kind.
#[derive(Debug, Clone)]
pub struct ParseNoteKindError(String);

impl fmt::Display for ParseNoteKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseNoteKindError {}

impl NoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteKind::Topic => "topic",
            NoteKind::Subtopic => "subtopic",
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteKind {
    type Err = ParseNoteKindError;

    // Exact match: `Topic` or ` topic` are not topics.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "topic" => Ok(NoteKind::Topic),
            "subtopic" => Ok(NoteKind::Subtopic),
            other => Err(ParseNoteKindError(format!("unknown note type '{}'", other))),
        }
    }
}
