//! Deterministic ordering of pages and root sections.
//!
//! Explicit order lists name pages or sections by id or display name.
//! Anything not named keeps its original relative position after the named
//! items, so repeated builds over the same input order identically.

use sg_comments::{AccumulatedContext, Page, Section, slugify};
use sg_config::SortOrderEntry;

/// Something that can be named in an order list.
pub trait Categorized {
    fn id(&self) -> &str;
    fn name(&self) -> &str;

    /// Whether the order list entry `key` refers to this item.
    fn is_named(&self, key: &str) -> bool {
        key == self.id() || key.eq_ignore_ascii_case(self.name()) || slugify(key) == self.id()
    }
}

impl Categorized for Page {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Categorized for Section {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Stable sort putting items named in `order` first, in that order.
///
/// `[a, b, c, d]` sorted by `[c, a]` gives `[c, a, b, d]`.
pub fn sort_category_by<T: Categorized>(items: &mut [T], order: &[String]) {
    if order.is_empty() {
        return;
    }
    items.sort_by_key(|item| {
        order
            .iter()
            .position(|key| item.is_named(key))
            .unwrap_or(order.len())
    });
}

/// Fill `context.page_order` from the explicit order.
///
/// Named pages come first in the given order, then every remaining page in
/// insertion order. Entries carrying a section list also set the named
/// page's `section_order`. Names matching no page are skipped.
pub fn generate_sort_order(context: &mut AccumulatedContext, explicit: &[SortOrderEntry]) {
    let mut page_order: Vec<String> = Vec::with_capacity(context.pages.len());

    for entry in explicit {
        match entry {
            SortOrderEntry::Page(name) => {
                push_page(context, &mut page_order, name);
            }
            SortOrderEntry::WithSections(map) => {
                for (name, sections) in map {
                    if let Some(index) = push_page(context, &mut page_order, name) {
                        context.pages[index].section_order.clone_from(sections);
                    }
                }
            }
        }
    }

    for page in &context.pages {
        if !page_order.contains(&page.id) {
            page_order.push(page.id.clone());
        }
    }

    context.page_order = page_order;
}

fn push_page(
    context: &AccumulatedContext,
    page_order: &mut Vec<String>,
    name: &str,
) -> Option<usize> {
    let Some(index) = context.pages.iter().position(|p| p.is_named(name)) else {
        tracing::debug!(page = %name, "Sort order names an unknown page");
        return None;
    };
    let id = &context.pages[index].id;
    if !page_order.contains(id) {
        page_order.push(id.clone());
    }
    Some(index)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use sg_comments::{ContextBuilder, SectionDraft, SourceLocation};

    use super::*;

    fn page(id: &str) -> Page {
        Page {
            id: id.to_owned(),
            name: id.to_uppercase(),
            sections: Vec::new(),
            section_order: Vec::new(),
        }
    }

    fn ids(pages: &[Page]) -> Vec<&str> {
        pages.iter().map(|p| p.id.as_str()).collect()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    fn context_with_pages(names: &[&str]) -> AccumulatedContext {
        let mut builder = ContextBuilder::default();
        for name in names {
            let draft = SectionDraft {
                name: Some(format!("{name} intro")),
                page: Some((*name).to_owned()),
                ..SectionDraft::default()
            };
            builder
                .add_section(draft, SourceLocation::new("a.css", 1))
                .unwrap();
        }
        builder.snapshot()
    }

    #[test]
    fn sort_category_by_is_stable() {
        let mut pages = vec![page("a"), page("b"), page("c"), page("d")];
        sort_category_by(&mut pages, &strings(&["c", "a"]));
        assert_eq!(ids(&pages), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn sort_category_by_matches_names_case_insensitively() {
        let mut pages = vec![page("a"), page("b")];
        sort_category_by(&mut pages, &strings(&["b"]));
        assert_eq!(ids(&pages), vec!["b", "a"]);

        let mut pages = vec![page("a"), page("b")];
        sort_category_by(&mut pages, &strings(&["B"]));
        assert_eq!(ids(&pages), vec!["b", "a"]);
    }

    #[test]
    fn sort_category_by_empty_order_keeps_input() {
        let mut pages = vec![page("b"), page("a")];
        sort_category_by(&mut pages, &[]);
        assert_eq!(ids(&pages), vec!["b", "a"]);
    }

    #[test]
    fn sort_category_by_ignores_unknown_keys() {
        let mut pages = vec![page("a"), page("b"), page("c")];
        sort_category_by(&mut pages, &strings(&["zzz", "c"]));
        assert_eq!(ids(&pages), vec!["c", "a", "b"]);
    }

    #[test]
    fn explicit_page_first_then_insertion_order() {
        let mut context = context_with_pages(&["buttons", "forms"]);
        generate_sort_order(&mut context, &[SortOrderEntry::Page("forms".to_owned())]);
        assert_eq!(context.page_order, strings(&["forms", "buttons"]));
    }

    #[test]
    fn generate_sort_order_is_idempotent() {
        let mut context = context_with_pages(&["a", "b", "c"]);
        let explicit = [
            SortOrderEntry::Page("c".to_owned()),
            SortOrderEntry::Page("C".to_owned()),
        ];
        generate_sort_order(&mut context, &explicit);
        let first = context.page_order.clone();
        generate_sort_order(&mut context, &explicit);

        assert_eq!(context.page_order, first);
        assert_eq!(first, strings(&["c", "a", "b"]));
    }

    #[test]
    fn entry_with_sections_sets_section_order() {
        let mut context = context_with_pages(&["buttons", "forms"]);
        let explicit = [SortOrderEntry::WithSections(BTreeMap::from([(
            "Forms".to_owned(),
            strings(&["Inputs", "Selects"]),
        )]))];

        generate_sort_order(&mut context, &explicit);

        assert_eq!(context.page_order, strings(&["forms", "buttons"]));
        assert_eq!(context.pages[1].section_order, strings(&["Inputs", "Selects"]));
        assert!(context.pages[0].section_order.is_empty());
    }

    #[test]
    fn unknown_page_names_skipped() {
        let mut context = context_with_pages(&["a"]);
        generate_sort_order(&mut context, &[SortOrderEntry::Page("ghost".to_owned())]);
        assert_eq!(context.page_order, strings(&["a"]));
    }
}
