//! Core types: note kinds, link references, progress ratios

mod kind;
mod link;
mod progress;

pub use kind::{NoteKind, ParseNoteKindError};
pub use link::{LinkRef, ParseLinkError, extract_link_text};
pub use progress::{
    BAR_EMPTY, BAR_FILLED, ProgressStatus, SubtopicState, TopicProgress, format_ratio, percent,
    render_bar, round_ratio,
};
