//! Wiki-link references between notes (`[[Name]]`).

use std::fmt;
use std::str::FromStr;

/// Returns the note name inside a `[[Name]]` reference.
///
/// Anything that is not wrapped in double brackets is returned unchanged.
/// A display alias (`[[Name|Shown]]`) and a heading or block fragment
/// (`[[Name#Heading]]`, `[[Name#^block]]`) are dropped.
///
/// # Examples
///
/// ```
/// use trail::domain::extract_link_text;
///
/// assert_eq!(extract_link_text("[[Rust Basics]]"), "Rust Basics");
/// assert_eq!(extract_link_text("[[Rust Basics#Traits|basics]]"), "Rust Basics");
/// assert_eq!(extract_link_text("Rust Basics"), "Rust Basics");
/// ```
pub fn extract_link_text(reference: &str) -> &str {
    let Some(inner) = reference
        .strip_prefix("[[")
        .and_then(|rest| rest.strip_suffix("]]"))
    else {
        return reference;
    };

    let target = match inner.split_once('|') {
        Some((target, _alias)) => target,
        None => inner,
    };
    match target.split_once('#') {
        Some((name, _fragment)) => name,
        None => target,
    }
}

/// A reference to another note by base name.
///
/// Stored without brackets; `Display` renders the `[[Name]]` form.
///
/// # Examples
///
/// ```
/// use trail::domain::LinkRef;
///
/// let link: LinkRef = "[[Ownership]]".parse().unwrap();
/// assert_eq!(link.name(), "Ownership");
/// assert_eq!(link.to_string(), "[[Ownership]]");
/// assert_eq!(link.quoted(), "\"[[Ownership]]\"");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LinkRef(String);

/// Error returned when a link reference names nothing.
#[derive(Debug, Clone)]
pub struct ParseLinkError(String);

impl fmt::Display for ParseLinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseLinkError {}

impl LinkRef {
    /// Creates a link from either a bare name or a `[[Name]]` reference.
    ///
    /// # Errors
    ///
    /// Returns `ParseLinkError` if the name is empty after trimming, or
    /// contains characters that cannot appear in a file name.
    pub fn new(reference: &str) -> Result<Self, ParseLinkError> {
        let name = extract_link_text(reference.trim()).trim();

        if name.is_empty() {
            return Err(ParseLinkError("link target cannot be empty".to_string()));
        }

        if name.contains(['[', ']', '|', '\n']) {
            return Err(ParseLinkError(format!(
                "invalid link target '{}': brackets, pipes and newlines are not allowed",
                name
            )));
        }

        Ok(Self(name.to_string()))
    }

    /// Returns the note name the link points at.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Returns the relative file name of the target note (`Name.md`).
    pub fn file_name(&self) -> String {
        format!("{}.md", self.0)
    }

    /// Returns the reference in the quoted form written to frontmatter.
    pub fn quoted(&self) -> String {
        format!("\"[[{}]]\"", self.0)
    }
}

impl fmt::Display for LinkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[[{}]]", self.0)
    }
}

impl fmt::Debug for LinkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LinkRef(\"{}\")", self.0)
    }
}

impl FromStr for LinkRef {
    type Err = ParseLinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
