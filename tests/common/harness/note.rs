//! Builder for topic and subtopic notes with sensible defaults.

// Allow dead code since this is a test utility with methods for future tests
#![allow(dead_code)]

/// What kind of note a [`TestNote`] renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Topic,
    Subtopic,
    Plain,
}

/// Builder for creating vault notes with a fluent API.
///
/// Topics render their `subtopics` as a block list; subtopics render
/// `completed` and an optional `parent` link.
#[derive(Debug)]
pub struct TestNote {
    name: String,
    kind: Kind,
    subtopics: Vec<String>,
    completed: bool,
    parent: Option<String>,
    body: String,
}

impl TestNote {
    fn with_kind(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            subtopics: Vec::new(),
            completed: false,
            parent: None,
            body: String::new(),
        }
    }

    /// A note with `type: topic`.
    pub fn topic(name: impl Into<String>) -> Self {
        Self::with_kind(name, Kind::Topic)
    }

    /// A note with `type: subtopic`, not completed.
    pub fn subtopic(name: impl Into<String>) -> Self {
        Self::with_kind(name, Kind::Subtopic)
    }

    /// A note without frontmatter.
    pub fn plain(name: impl Into<String>) -> Self {
        Self::with_kind(name, Kind::Plain)
    }

    /// Lists a subtopic by name (topics only).
    pub fn listing(mut self, subtopic: impl Into<String>) -> Self {
        self.subtopics.push(subtopic.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Sets the parent topic (subtopics only).
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Sets the body content (builder method).
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the vault-relative file name.
    pub fn file_name(&self) -> String {
        format!("{}.md", self.name)
    }

    /// Renders the full note text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        match self.kind {
            Kind::Plain => {}
            Kind::Topic => {
                out.push_str("---\ntype: topic\n");
                if self.subtopics.is_empty() {
                    out.push_str("subtopics: []\n");
                } else {
                    out.push_str("subtopics:\n");
                    for subtopic in &self.subtopics {
                        out.push_str(&format!("  - \"[[{}]]\"\n", subtopic));
                    }
                }
                out.push_str("---\n");
            }
            Kind::Subtopic => {
                out.push_str("---\ntype: subtopic\n");
                if let Some(parent) = &self.parent {
                    out.push_str(&format!("parent: \"[[{}]]\"\n", parent));
                }
                out.push_str(&format!("completed: {}\n", self.completed));
                out.push_str("---\n");
            }
        }
        out.push_str(&format!("# {}\n", self.name));
        if !self.body.is_empty() {
            out.push('\n');
            out.push_str(&self.body);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_renders_block_list() {
        let note = TestNote::topic("Rust").listing("A").listing("B");
        assert_eq!(
            note.render(),
            "---\ntype: topic\nsubtopics:\n  - \"[[A]]\"\n  - \"[[B]]\"\n---\n# Rust\n"
        );
    }

    #[test]
    fn subtopic_renders_parent_and_completion() {
        let note = TestNote::subtopic("A").parent("Rust").completed(true);
        assert_eq!(
            note.render(),
            "---\ntype: subtopic\nparent: \"[[Rust]]\"\ncompleted: true\n---\n# A\n"
        );
    }

    #[test]
    fn plain_note_has_no_frontmatter() {
        let note = TestNote::plain("Scratch").body("text\n");
        assert_eq!(note.render(), "# Scratch\n\ntext\n");
        assert_eq!(note.file_name(), "Scratch.md");
    }
}
