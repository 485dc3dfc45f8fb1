//! Per-page rendering context.
//!
//! Every page gets its own [`PageContext`], cloned from the shared
//! accumulated context, so pruning or hook edits never leak to other pages.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use sg_comments::{AccumulatedContext, Example, NavEntry, Page, Section};

/// Context a single page is rendered with.
#[derive(Clone, Debug, PartialEq)]
pub struct PageContext {
    /// Identifier of the page being rendered.
    pub id: String,
    pub title: String,
    pub footer_html: String,
    pub menu_button_html: String,
    /// Stylesheet URLs linked from the page.
    pub global_stylesheets: Vec<String>,
    /// Stylesheet files inlined at render time.
    pub stylesheets: Vec<String>,
    /// Inline CSS: configured entries first, then build assets.
    pub parsed_stylesheets: Vec<String>,
    /// Script URLs.
    pub scripts: Vec<String>,
    /// Navigation, with this page's entry selected.
    pub navbar: Option<Vec<NavEntry>>,
    /// All pages in final order.
    pub pages: Vec<Page>,
    pub page_order: Vec<String>,
    /// Sections of this page; pruned to roots before rendering.
    pub sections: Vec<Section>,
    /// Explicit order of this page's root sections.
    pub section_order: Vec<String>,
    /// Extra values set by the preprocess hook, exposed at the template root.
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PageContext {
    /// Clone the page-independent parts of `shared`.
    #[must_use]
    pub fn from_shared(shared: &AccumulatedContext) -> Self {
        Self {
            id: String::new(),
            title: shared.title.clone(),
            footer_html: shared.footer_html.clone(),
            menu_button_html: shared.menu_button_html.clone(),
            global_stylesheets: shared.global_stylesheets.clone(),
            stylesheets: shared
                .stylesheets
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            parsed_stylesheets: Vec::new(),
            scripts: shared.scripts.clone(),
            navbar: shared.navbar.clone(),
            pages: shared.pages.clone(),
            page_order: shared.page_order.clone(),
            sections: Vec::new(),
            section_order: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Display name of the page being rendered.
    #[must_use]
    pub fn page_name(&self) -> Option<&str> {
        self.pages
            .iter()
            .find(|p| p.id == self.id)
            .map(|p| p.name.as_str())
    }

    /// Borrowed view handed to the template engine.
    ///
    /// `catalog` resolves child identifiers; sections missing from it are
    /// left out.
    pub(crate) fn template_data<'a>(&'a self, catalog: &'a SectionCatalog) -> TemplateData<'a> {
        let mut visited = HashSet::new();
        TemplateData {
            id: &self.id,
            title: &self.title,
            footer_html: &self.footer_html,
            menu_button_html: &self.menu_button_html,
            global_stylesheets: &self.global_stylesheets,
            stylesheets: &self.stylesheets,
            parsed_stylesheets: &self.parsed_stylesheets,
            scripts: &self.scripts,
            navbar: self.navbar.as_deref(),
            section_order: &self.section_order,
            sections: self
                .sections
                .iter()
                .map(|s| SectionView::build(s, 0, catalog, &mut visited))
                .collect(),
            extra: &self.extra,
        }
    }
}

/// Section lookup by identifier, taken before root pruning.
#[derive(Debug, Default)]
pub(crate) struct SectionCatalog {
    sections: HashMap<String, Section>,
}

impl SectionCatalog {
    pub(crate) fn new(sections: &[Section]) -> Self {
        Self {
            sections: sections.iter().map(|s| (s.id.clone(), s.clone())).collect(),
        }
    }

    fn get(&self, id: &str) -> Option<&Section> {
        self.sections.get(id)
    }
}

#[derive(Serialize)]
pub(crate) struct TemplateData<'a> {
    id: &'a str,
    title: &'a str,
    footer_html: &'a str,
    menu_button_html: &'a str,
    global_stylesheets: &'a [String],
    stylesheets: &'a [String],
    parsed_stylesheets: &'a [String],
    scripts: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    navbar: Option<&'a [NavEntry]>,
    section_order: &'a [String],
    sections: Vec<SectionView<'a>>,
    #[serde(flatten)]
    extra: &'a BTreeMap<String, serde_json::Value>,
}

/// A section with its children resolved into a nested tree.
#[derive(Debug, Serialize)]
pub(crate) struct SectionView<'a> {
    id: &'a str,
    name: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    example: Option<&'a Example>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a Example>,
    depth: usize,
    heading: usize,
    children: Vec<SectionView<'a>>,
}

impl<'a> SectionView<'a> {
    fn build(
        section: &'a Section,
        depth: usize,
        catalog: &'a SectionCatalog,
        visited: &mut HashSet<&'a str>,
    ) -> Self {
        visited.insert(&section.id);

        let mut children: Vec<&Section> = section
            .children
            .iter()
            .filter_map(|id| catalog.get(id))
            .collect();
        // Children with an explicit order first, ascending; the rest keep
        // declaration order.
        children.sort_by_key(|c| (c.order.is_none(), c.order));

        let mut views = Vec::with_capacity(children.len());
        for child in children {
            if !visited.contains(child.id.as_str()) {
                views.push(Self::build(child, depth + 1, catalog, visited));
            }
        }

        Self {
            id: &section.id,
            name: &section.name,
            content: &section.content,
            example: section.example.as_ref(),
            code: section.code.as_ref(),
            depth,
            heading: (depth + 2).min(6),
            children: views,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sg_comments::{ContextBuilder, ContextDefaults, SectionDraft, SourceLocation};

    use super::*;

    fn section(id: &str, parent: Option<&str>, children: &[&str], order: Option<i64>) -> Section {
        Section {
            id: id.to_owned(),
            name: id.to_owned(),
            content: String::new(),
            parent: parent.map(str::to_owned),
            children: children.iter().map(|c| (*c).to_owned()).collect(),
            order,
            page: Some("index".to_owned()),
            example: None,
            code: None,
            location: SourceLocation::default(),
        }
    }

    #[test]
    fn from_shared_copies_defaults() {
        let mut builder = ContextBuilder::new(ContextDefaults {
            title: "Acme".to_owned(),
            stylesheets: vec!["/p/preview.css".into()],
            ..ContextDefaults::default()
        });
        builder
            .add_section(
                SectionDraft {
                    name: Some("Buttons".to_owned()),
                    ..SectionDraft::default()
                },
                SourceLocation::default(),
            )
            .unwrap();
        let shared = builder.snapshot();

        let context = PageContext::from_shared(&shared);

        assert_eq!(context.title, "Acme");
        assert_eq!(context.stylesheets, vec!["/p/preview.css".to_owned()]);
        assert_eq!(context.pages.len(), 1);
        assert!(context.sections.is_empty());
    }

    #[test]
    fn template_data_nests_children_by_order() {
        let all = vec![
            section("root", None, &["late", "early", "plain"], None),
            section("late", Some("root"), &[], Some(5)),
            section("early", Some("root"), &[], Some(1)),
            section("plain", Some("root"), &["leaf"], None),
            section("leaf", Some("plain"), &[], None),
        ];
        let catalog = SectionCatalog::new(&all);
        let mut context = PageContext::from_shared(&ContextBuilder::default().snapshot());
        context.sections = vec![all[0].clone()];

        let data = context.template_data(&catalog);
        let root = &data.sections[0];
        let child_ids: Vec<_> = root.children.iter().map(|c| c.id).collect();

        assert_eq!(child_ids, vec!["early", "late", "plain"]);
        assert_eq!(root.heading, 2);
        assert_eq!(root.children[2].children[0].id, "leaf");
        assert_eq!(root.children[2].children[0].depth, 2);
    }

    #[test]
    fn extra_values_flattened_into_template_root() {
        let catalog = SectionCatalog::default();
        let mut context = PageContext::from_shared(&ContextBuilder::default().snapshot());
        context
            .extra
            .insert("version".to_owned(), serde_json::json!("1.2.0"));

        let value = serde_json::to_value(context.template_data(&catalog)).unwrap();

        assert_eq!(value["version"], "1.2.0");
        assert!(value.get("navbar").is_none());
    }
}
