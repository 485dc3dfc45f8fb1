//! Turns the accumulated context into one render job per page.

use std::sync::Arc;

use sg_comments::{AccumulatedContext, NavEntry};
use sg_config::SortOrderEntry;

use crate::error::BuildError;
use crate::hooks::Preprocess;
use crate::order::{generate_sort_order, sort_category_by};
use crate::page_context::PageContext;

/// Everything needed to render one page.
#[derive(Clone, Debug)]
pub struct RenderJob {
    /// Output URL, `<dest>/<page>.html`.
    pub url: String,
    /// Page template source, shared by every job.
    pub template: Arc<str>,
    pub context: PageContext,
    pub preprocess: Option<Preprocess>,
}

/// Inputs of page assembly besides the context.
#[derive(Clone, Debug, Default)]
pub struct AssembleOptions {
    pub dest: String,
    pub sort_order: Vec<SortOrderEntry>,
    pub template: Arc<str>,
    pub preprocess: Option<Preprocess>,
}

/// Assemble render jobs from a parsed context.
///
/// Fails if any section still references an undefined parent. No pages is
/// not an error: a warning is logged and no jobs are returned.
pub fn assemble_pages(
    mut context: AccumulatedContext,
    options: &AssembleOptions,
) -> Result<Vec<RenderJob>, BuildError> {
    context.forward_references.ensure_resolved()?;

    generate_sort_order(&mut context, &options.sort_order);
    sort_category_by(&mut context.pages, &context.page_order);

    if context.pages.is_empty() {
        tracing::warn!("No pages generated from source files");
        return Ok(Vec::new());
    }

    if context.pages.len() > 1 {
        context.navbar = Some(
            context
                .pages
                .iter()
                .map(|page| NavEntry {
                    name: page.name.clone(),
                    url: format!("{}.html", page.id),
                    selected: false,
                })
                .collect(),
        );
    }

    let shared = PageContext::from_shared(&context);
    let jobs = context
        .pages
        .iter()
        .enumerate()
        .map(|(index, page)| {
            let mut page_context = shared.clone();
            page_context.id.clone_from(&page.id);
            page_context.sections.clone_from(&page.sections);
            page_context.section_order.clone_from(&page.section_order);
            if let Some(entry) = page_context
                .navbar
                .as_mut()
                .and_then(|navbar| navbar.get_mut(index))
            {
                entry.selected = true;
            }

            RenderJob {
                url: page_url(&options.dest, &page.id),
                template: Arc::clone(&options.template),
                context: page_context,
                preprocess: options.preprocess.clone(),
            }
        })
        .collect();

    tracing::debug!(pages = context.pages.len(), "Assembled pages");
    Ok(jobs)
}

fn page_url(dest: &str, id: &str) -> String {
    let dest = dest.trim_end_matches('/');
    if dest.is_empty() {
        format!("{id}.html")
    } else {
        format!("{dest}/{id}.html")
    }
}
