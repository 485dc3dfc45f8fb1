//! Sections and pages extracted from documentation comments.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Identifier of a section, derived from its name with [`slugify`].
pub type SectionId = String;

/// Position of a documentation comment in its source file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file path.
    pub file: PathBuf,
    /// 1-based line of the comment opener.
    pub line: usize,
}

impl SourceLocation {
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// Example markup rendered live in the style guide.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Example {
    /// Raw example source.
    pub content: String,
    /// Example language (e.g. "html").
    pub lang: String,
}

/// A documented unit extracted from a structured comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Unique identifier (slug of the name).
    pub id: SectionId,
    /// Display name.
    pub name: String,
    /// Description rendered to HTML.
    pub content: String,
    /// Parent section identifier. `None` for root sections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<SectionId>,
    /// Child section identifiers in declaration order.
    pub children: Vec<SectionId>,
    /// Explicit position among siblings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Owning page identifier. `None` while the parent is unresolved.
    #[serde(skip)]
    pub page: Option<String>,
    /// Live example.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Example>,
    /// Code listing shown next to the example.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Example>,
    /// Where the section was declared.
    #[serde(skip)]
    pub location: SourceLocation,
}

impl Section {
    /// Whether the section has no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A named collection of sections rendered to one output file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Unique identifier (slug of the name), used as the output file stem.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Every section of the page, roots and descendants, in declaration order.
    pub sections: Vec<Section>,
    /// Explicit order of the page's root sections.
    pub section_order: Vec<String>,
}

impl Page {
    /// Look up a section of this page by identifier.
    #[must_use]
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }
}

/// Convert a display name to an identifier.
///
/// Lowercases, turns whitespace runs into `-` and drops anything that is not
/// alphanumeric, `-` or `_`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.trim().chars() {
        if c.is_whitespace() {
            pending_dash = !slug.is_empty();
        } else if c.is_alphanumeric() || c == '-' || c == '_' {
            if pending_dash {
                slug.push('-');
                pending_dash = false;
            }
            slug.extend(c.to_lowercase());
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_dashes() {
        assert_eq!(slugify("Primary Buttons"), "primary-buttons");
    }

    #[test]
    fn slugify_strips_punctuation() {
        assert_eq!(slugify("Forms & Inputs!"), "forms-inputs");
    }

    #[test]
    fn slugify_collapses_whitespace() {
        assert_eq!(slugify("  Grid \t  System "), "grid-system");
    }

    #[test]
    fn slugify_keeps_underscores() {
        assert_eq!(slugify("btn_group"), "btn_group");
    }

    #[test]
    fn location_display() {
        let location = SourceLocation::new("styles/buttons.scss", 12);
        assert_eq!(location.to_string(), "styles/buttons.scss:12");
    }
}
