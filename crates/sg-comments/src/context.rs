//! Accumulation of parsed sections into pages.
//!
//! [`ContextBuilder`] is the mutable arena the parser appends to while it
//! walks source files. [`ContextBuilder::snapshot`] freezes it into an
//! [`AccumulatedContext`] and splits the section arena into pages.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::Serialize;

use crate::error::ParseError;
use crate::forward::{ForwardReferences, PendingReference};
use crate::section::{Example, Page, Section, SectionId, SourceLocation, slugify};

/// Page receiving sections that declare no `@page`.
pub const DEFAULT_PAGE: &str = "index";

/// Navigation entry linking to one generated page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    /// Page display name.
    pub name: String,
    /// Page URL relative to the style guide root.
    pub url: String,
    /// Whether this entry is the page being rendered.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

/// Values every page context starts from.
#[derive(Clone, Debug)]
pub struct ContextDefaults {
    pub title: String,
    pub footer_html: String,
    pub menu_button_html: String,
    pub global_stylesheets: Vec<String>,
    /// Stylesheet files inlined into example previews at render time.
    pub stylesheets: Vec<PathBuf>,
    pub scripts: Vec<String>,
}

impl Default for ContextDefaults {
    fn default() -> Self {
        Self {
            title: String::new(),
            footer_html: String::new(),
            menu_button_html: "Menu".to_owned(),
            global_stylesheets: Vec::new(),
            stylesheets: Vec::new(),
            scripts: Vec::new(),
        }
    }
}

/// A section as collected from one comment block, before it is committed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionDraft {
    /// Section name; blocks without one are not documentation.
    pub name: Option<String>,
    /// Markdown description.
    pub description: String,
    /// Name of the parent section (`@sectionof`).
    pub parent: Option<String>,
    /// Name of the page (`@page`).
    pub page: Option<String>,
    pub order: Option<i64>,
    pub example: Option<Example>,
    pub code: Option<Example>,
}

/// Immutable result of the parse phase.
#[derive(Clone, Debug)]
pub struct AccumulatedContext {
    /// Pages in order of first appearance.
    pub pages: Vec<Page>,
    /// Resolved page order (page ids); filled by the order resolver.
    pub page_order: Vec<String>,
    /// Every parsed section, before the split into pages.
    pub sections: Vec<Section>,
    pub stylesheets: Vec<PathBuf>,
    pub scripts: Vec<String>,
    pub global_stylesheets: Vec<String>,
    pub title: String,
    pub footer_html: String,
    pub menu_button_html: String,
    /// Navigation across pages; only present with two or more pages.
    pub navbar: Option<Vec<NavEntry>>,
    /// References still waiting for their parent section.
    pub forward_references: ForwardReferences,
}

/// Mutable arena populated by a [`CommentParser`](crate::CommentParser).
#[derive(Debug)]
pub struct ContextBuilder {
    defaults: ContextDefaults,
    pages: Vec<(String, String)>,
    sections: Vec<Section>,
    section_index: HashMap<SectionId, usize>,
    forward: ForwardReferences,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(ContextDefaults::default())
    }
}

impl ContextBuilder {
    #[must_use]
    pub fn new(defaults: ContextDefaults) -> Self {
        Self {
            defaults,
            pages: Vec::new(),
            sections: Vec::new(),
            section_index: HashMap::new(),
            forward: ForwardReferences::new(),
        }
    }

    /// Number of sections committed so far.
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Look up a committed section.
    #[must_use]
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.section_index.get(id).map(|&i| &self.sections[i])
    }

    /// Register a page by name, returning its identifier.
    pub fn ensure_page(&mut self, name: &str) -> String {
        let id = slugify(name);
        if !self.pages.iter().any(|(page_id, _)| *page_id == id) {
            self.pages.push((id.clone(), name.trim().to_owned()));
        }
        id
    }

    /// Commit a section draft.
    ///
    /// A draft whose parent is not defined yet is linked once the parent is
    /// committed; until then it belongs to no page.
    pub fn add_section(
        &mut self,
        draft: SectionDraft,
        location: SourceLocation,
    ) -> Result<(), ParseError> {
        let Some(name) = draft.name else {
            return Ok(());
        };
        let id = slugify(&name);
        if id.is_empty() {
            return Err(ParseError::InvalidTag {
                tag: "section".to_owned(),
                location,
                message: format!("section name {name:?} has no usable characters"),
            });
        }
        if let Some(existing) = self.section(&id) {
            return Err(ParseError::DuplicateSection {
                id,
                first: existing.location.clone(),
                location,
            });
        }

        let parent = draft.parent.as_deref().map(slugify);
        if parent.as_deref() == Some(id.as_str()) {
            return Err(ParseError::CycleDetected { id, location });
        }
        let page = match &parent {
            Some(parent_id) => match self.section_index.get(parent_id) {
                Some(&index) => {
                    self.sections[index].children.push(id.clone());
                    self.sections[index].page.clone()
                }
                None => {
                    tracing::debug!(section = %id, parent = %parent_id, "Forward reference");
                    self.forward.register(
                        parent_id,
                        PendingReference {
                            child: id.clone(),
                            error: format!(
                                "section {:?} is declared as @sectionof {:?}, which is never defined",
                                name,
                                draft.parent.as_deref().unwrap_or_default(),
                            ),
                            location: location.clone(),
                        },
                    );
                    None
                }
            },
            None => Some(self.ensure_page(draft.page.as_deref().unwrap_or(DEFAULT_PAGE))),
        };

        self.section_index.insert(id.clone(), self.sections.len());
        self.sections.push(Section {
            id: id.clone(),
            name: name.trim().to_owned(),
            content: render_markdown(&draft.description),
            parent,
            children: Vec::new(),
            order: draft.order,
            page,
            example: draft.example,
            code: draft.code,
            location,
        });

        let waiting_children = self.forward.resolve(&id);
        if let Some(cyclic) = waiting_children
            .iter()
            .find(|waiting| self.is_ancestor(&waiting.child, &id))
        {
            return Err(ParseError::CycleDetected {
                id: cyclic.child.clone(),
                location: cyclic.location.clone(),
            });
        }
        for waiting in waiting_children {
            let index = self.section_index[&id];
            self.sections[index].children.push(waiting.child.clone());
            let page = self.sections[index].page.clone();
            self.assign_page(&waiting.child, page.as_ref());
        }

        Ok(())
    }

    /// Whether `candidate` is `id` or one of its committed ancestors.
    fn is_ancestor(&self, candidate: &str, id: &str) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == candidate {
                return true;
            }
            if !seen.insert(current_id) {
                return false;
            }
            current = self.section(current_id).and_then(|s| s.parent.as_deref());
        }
        false
    }

    /// Give `id` and all its descendants the page `page`.
    fn assign_page(&mut self, id: &str, page: Option<&String>) {
        let mut visited = HashSet::new();
        let mut stack = vec![id.to_owned()];
        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            if let Some(&index) = self.section_index.get(&current) {
                let section = &mut self.sections[index];
                section.page = page.cloned();
                stack.extend(section.children.iter().cloned());
            }
        }
    }

    /// Freeze the arena into an immutable context.
    #[must_use]
    pub fn snapshot(self) -> AccumulatedContext {
        let pages = self
            .pages
            .into_iter()
            .map(|(id, name)| Page {
                sections: self
                    .sections
                    .iter()
                    .filter(|s| s.page.as_deref() == Some(id.as_str()))
                    .cloned()
                    .collect(),
                id,
                name,
                section_order: Vec::new(),
            })
            .collect();

        AccumulatedContext {
            pages,
            page_order: Vec::new(),
            sections: self.sections,
            stylesheets: self.defaults.stylesheets,
            scripts: self.defaults.scripts,
            global_stylesheets: self.defaults.global_stylesheets,
            title: self.defaults.title,
            footer_html: self.defaults.footer_html,
            menu_button_html: self.defaults.menu_button_html,
            navbar: None,
            forward_references: self.forward,
        }
    }
}

fn render_markdown(source: &str) -> String {
    let source = source.trim();
    if source.is_empty() {
        return String::new();
    }
    let parser = pulldown_cmark::Parser::new_ext(source, pulldown_cmark::Options::ENABLE_TABLES);
    let mut html = String::with_capacity(source.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}
