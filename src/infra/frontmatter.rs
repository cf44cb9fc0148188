//! Frontmatter model for the `key: value` dialect used by topic and subtopic notes.
//!
//! This is not a YAML parser. A block is split into top-level entries, each
//! owning the lines that follow it until the next top-level key. Entries are
//! parsed once into a [`FieldValue`]; entries that are never written keep
//! their original text and serialize back unchanged.

use chrono::NaiveDate;

use crate::domain::{NoteKind, format_ratio};

/// Splits a document into its frontmatter block and body.
///
/// The document must start with a `---` line. The block ends at the next
/// line that is exactly `---`. The returned block includes the newline of its
/// last line; the body starts after the closing delimiter line.
pub fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let after_opening = if text.starts_with("---\r\n") {
        5
    } else if text.starts_with("---\n") {
        4
    } else {
        return None;
    };

    let rest = &text[after_opening..];
    let closing = find_closing_delimiter(rest)?;
    let block = &rest[..closing];

    let after_closing = &rest[closing..];
    let delimiter_len = if after_closing.starts_with("---\r\n") {
        5
    } else if after_closing.starts_with("---\n") {
        4
    } else {
        3
    };

    Some((block, &after_closing[delimiter_len..]))
}

/// Returns the frontmatter block of a document, if it has one.
pub fn read_frontmatter_block(text: &str) -> Option<&str> {
    split_frontmatter(text).map(|(block, _)| block)
}

/// Substitutes the frontmatter block of a document.
///
/// Returns `None` when the document has no frontmatter to replace.
pub fn replace_frontmatter_block(text: &str, block: &str) -> Option<String> {
    let (_, body) = split_frontmatter(text)?;
    Some(join_document(block, body))
}

fn join_document(block: &str, body: &str) -> String {
    let mut out = String::with_capacity(block.len() + body.len() + 8);
    out.push_str("---\n");
    out.push_str(block);
    if !block.is_empty() && !block.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("---\n");
    out.push_str(body);
    out
}

/// Finds the byte offset of the closing `---` line.
fn find_closing_delimiter(content: &str) -> Option<usize> {
    let mut pos = 0;
    while pos < content.len() {
        let line_end = content[pos..]
            .find('\n')
            .map(|offset| pos + offset)
            .unwrap_or(content.len());
        let line = content[pos..line_end].trim_end_matches('\r');
        if line == "---" {
            return Some(pos);
        }
        pos = line_end + 1;
    }
    None
}

/// A list-valued field, tagged with the shape it was written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListField {
    /// `key: [a, b, c]`
    Inline(Vec<String>),
    /// `key:` followed by `  - "a"` lines
    Block(Vec<String>),
}

impl ListField {
    pub fn items(&self) -> &[String] {
        match self {
            ListField::Inline(items) | ListField::Block(items) => items,
        }
    }

    pub fn into_items(self) -> Vec<String> {
        match self {
            ListField::Inline(items) | ListField::Block(items) => items,
        }
    }
}

/// The parsed value of one frontmatter entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Raw scalar text as written after the colon, quotes included.
    Scalar(String),
    List(ListField),
}

#[derive(Debug, Clone, PartialEq)]
struct Field {
    key: String,
    value: FieldValue,
    /// Original lines, dropped once the value is overwritten.
    source: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Field(Field),
    /// A line before the first key (comments, blank lines).
    Verbatim(String),
}

/// Ordered frontmatter entries with typed access to the fields this crate owns.
///
/// # Examples
///
/// ```
/// use trail::infra::Frontmatter;
///
/// let mut fm = Frontmatter::parse("type: topic\nsubtopics: [\"[[A]]\"]\n");
/// assert_eq!(fm.list("subtopics"), vec!["[[A]]"]);
///
/// fm.append_list_item("subtopics", "[[B]]");
/// assert_eq!(
///     fm.render(),
///     "type: topic\nsubtopics:\n  - \"[[A]]\"\n  - \"[[B]]\"\n"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    entries: Vec<Entry>,
}

impl Frontmatter {
    /// Parses a frontmatter block (the text between the `---` delimiters).
    pub fn parse(block: &str) -> Self {
        let mut entries = Vec::new();
        let mut current: Option<(String, String, Vec<String>)> = None;

        for line in block.lines() {
            if let Some((key, rest)) = top_level_key(line) {
                if let Some(pending) = current.take() {
                    entries.push(finish_field(pending));
                }
                current = Some((key.to_string(), rest.to_string(), vec![line.to_string()]));
            } else if let Some((_, _, lines)) = current.as_mut() {
                lines.push(line.to_string());
            } else {
                entries.push(Entry::Verbatim(line.to_string()));
            }
        }

        if let Some(pending) = current {
            entries.push(finish_field(pending));
        }

        Self { entries }
    }

    /// Parses the frontmatter of a whole document.
    pub fn from_document(text: &str) -> Option<Self> {
        read_frontmatter_block(text).map(Self::parse)
    }

    fn field(&self, key: &str) -> Option<&Field> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::Field(field) if field.key == key => Some(field),
            _ => None,
        })
    }

    /// Returns the parsed value of a field.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.field(key).map(|f| &f.value)
    }

    /// Returns whether a field is present.
    pub fn contains(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    /// Returns a scalar field with surrounding quotes decoded.
    ///
    /// List-valued fields have no scalar value.
    pub fn scalar(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            FieldValue::Scalar(raw) => Some(decode_scalar(raw)),
            FieldValue::List(_) => None,
        }
    }

    /// Returns the list field with its shape, if the field is a list.
    pub fn list_field(&self, key: &str) -> Option<&ListField> {
        match self.get(key)? {
            FieldValue::List(list) => Some(list),
            FieldValue::Scalar(_) => None,
        }
    }

    /// Returns the items of a list field (empty for absent or scalar fields).
    pub fn list(&self, key: &str) -> Vec<String> {
        self.list_field(key)
            .map(|list| list.items().to_vec())
            .unwrap_or_default()
    }

    /// Returns the note kind from the `type` field.
    pub fn kind(&self) -> Option<NoteKind> {
        self.scalar("type")?.parse().ok()
    }

    /// Returns a field that is literally `true` or `false`.
    pub fn bool_field(&self, key: &str) -> Option<bool> {
        match self.scalar(key)?.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    /// Returns a numeric field, if it parses.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.scalar(key)?.trim().parse().ok()
    }

    /// Returns a non-negative integer field, if it parses.
    pub fn count(&self, key: &str) -> Option<usize> {
        self.scalar(key)?.trim().parse().ok()
    }

    /// Sets a field, replacing it in place or appending it at the end.
    pub fn set(&mut self, key: &str, value: FieldValue) {
        for entry in &mut self.entries {
            if let Entry::Field(field) = entry
                && field.key == key
            {
                if field.value != value || field.source.is_none() {
                    field.value = value;
                    field.source = None;
                }
                return;
            }
        }

        self.entries.push(Entry::Field(Field {
            key: key.to_string(),
            value,
            source: None,
        }));
    }

    /// Sets a scalar field to raw text (written as-is after the colon).
    pub fn set_scalar(&mut self, key: &str, value: impl Into<String>) {
        self.set(key, FieldValue::Scalar(value.into()));
    }

    /// Sets a ratio field, rounded to two decimals.
    pub fn set_number(&mut self, key: &str, value: f64) {
        self.set_scalar(key, format_ratio(value));
    }

    pub fn set_count(&mut self, key: &str, value: usize) {
        self.set_scalar(key, value.to_string());
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set_scalar(key, if value { "true" } else { "false" });
    }

    /// Sets a date field in ISO form (`YYYY-MM-DD`).
    pub fn set_date(&mut self, key: &str, value: NaiveDate) {
        self.set_scalar(key, value.format("%Y-%m-%d").to_string());
    }

    /// Appends an item to a list field unless it is already present.
    ///
    /// The field is always written back as a block list, so an inline
    /// `[a, b]` becomes a block list on the first successful append. Absent
    /// or scalar fields become a one-item block list.
    ///
    /// Returns `true` if the item was added.
    pub fn append_list_item(&mut self, key: &str, item: &str) -> bool {
        let mut items = self.list(key);
        if items.iter().any(|existing| existing == item) {
            return false;
        }
        items.push(item.to_string());
        self.set(key, FieldValue::List(ListField::Block(items)));
        true
    }

    /// Serializes the block, one line per entry line, each ending in `\n`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            match entry {
                Entry::Verbatim(line) => {
                    out.push_str(line);
                    out.push('\n');
                }
                Entry::Field(Field {
                    source: Some(lines),
                    ..
                }) => {
                    for line in lines {
                        out.push_str(line);
                        out.push('\n');
                    }
                }
                Entry::Field(Field {
                    key,
                    value,
                    source: None,
                }) => render_field(&mut out, key, value),
            }
        }
        out
    }
}

/// Recognises a line that starts a new top-level entry.
fn top_level_key(line: &str) -> Option<(&str, &str)> {
    let first = line.chars().next()?;
    if first.is_whitespace() || matches!(first, '-' | '#' | '"' | '\'') {
        return None;
    }
    let (key, rest) = line.split_once(':')?;
    let key = key.trim_end();
    if key.is_empty() {
        return None;
    }
    Some((key, rest))
}

fn finish_field((key, rest, lines): (String, String, Vec<String>)) -> Entry {
    let value = parse_value(&rest, &lines[1..]);
    Entry::Field(Field {
        key,
        value,
        source: Some(lines),
    })
}

fn parse_value(rest: &str, continuation: &[String]) -> FieldValue {
    let rest = rest.trim();

    // An unquoted `[[Name]]` is a link, not a nested list.
    let bare_link = rest.starts_with("[[") && !rest.starts_with("[[[");

    if !bare_link && let Some(inner) = rest.strip_prefix('[') {
        let inner = inner.strip_suffix(']').unwrap_or(inner);
        let items = inner
            .split(',')
            .map(|item| decode_scalar(item.trim()))
            .filter(|item| !item.is_empty())
            .collect();
        return FieldValue::List(ListField::Inline(items));
    }

    if rest.is_empty() {
        let items: Vec<String> = continuation
            .iter()
            .filter_map(|line| line.trim().strip_prefix('-'))
            .map(|item| decode_scalar(item.trim()))
            .filter(|item| !item.is_empty())
            .collect();
        if !items.is_empty() {
            return FieldValue::List(ListField::Block(items));
        }
    }

    FieldValue::Scalar(rest.to_string())
}

fn render_field(out: &mut String, key: &str, value: &FieldValue) {
    match value {
        FieldValue::Scalar(raw) if raw.is_empty() => {
            out.push_str(key);
            out.push_str(":\n");
        }
        FieldValue::Scalar(raw) => {
            out.push_str(&format!("{}: {}\n", key, raw));
        }
        FieldValue::List(ListField::Inline(items)) => {
            let quoted: Vec<String> = items.iter().map(|item| quote(item)).collect();
            out.push_str(&format!("{}: [{}]\n", key, quoted.join(", ")));
        }
        FieldValue::List(ListField::Block(items)) if items.is_empty() => {
            out.push_str(&format!("{}: []\n", key));
        }
        FieldValue::List(ListField::Block(items)) => {
            out.push_str(key);
            out.push_str(":\n");
            for item in items {
                out.push_str(&format!("  - {}\n", quote(item)));
            }
        }
    }
}

/// Strips one pair of surrounding quotes, decoding YAML escapes where possible.
fn decode_scalar(raw: &str) -> String {
    let raw = raw.trim();
    let quoted = raw.len() >= 2
        && ((raw.starts_with('"') && raw.ends_with('"'))
            || (raw.starts_with('\'') && raw.ends_with('\'')));
    if !quoted {
        return raw.to_string();
    }
    serde_yaml::from_str::<String>(raw).unwrap_or_else(|_| raw[1..raw.len() - 1].to_string())
}

fn quote(item: &str) -> String {
    format!("\"{}\"", item.replace('\\', "\\\\").replace('"', "\\\""))
}
