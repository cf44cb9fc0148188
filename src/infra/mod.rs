//! File I/O, frontmatter and body editing, content hashing

mod body;
mod content_hash;
mod frontmatter;
mod fs;

pub use body::{read_section, read_status_line, replace_section, replace_status_line};
pub use content_hash::{ContentHash, ContentHashError};
pub use frontmatter::{
    FieldValue, Frontmatter, ListField, read_frontmatter_block, replace_frontmatter_block,
    split_frontmatter,
};
pub use fs::{FsError, FsNoteStore, NoteStore, note_name, note_path, scan_notes_directory};
