//! Preprocess hooks run on each page context before compilation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::page_context::PageContext;
use crate::templating::Templating;

/// Hook signature: page context, page template source, template environment.
///
/// The environment is a copy scoped to the page being rendered: partials a
/// hook registers are visible to that page only.
pub type PreprocessFn =
    dyn Fn(&mut PageContext, &str, &mut Templating) -> Result<(), String> + Send + Sync;

/// Preprocess hook attached to a render job.
#[derive(Clone)]
pub enum Preprocess {
    /// A callable hook.
    Hook(Arc<PreprocessFn>),
    /// A hook named in configuration that no registry entry matches.
    Unresolved(String),
}

impl Preprocess {
    /// Wrap a closure as a hook.
    pub fn hook<F>(f: F) -> Self
    where
        F: Fn(&mut PageContext, &str, &mut Templating) -> Result<(), String>
            + Send
            + Sync
            + 'static,
    {
        Self::Hook(Arc::new(f))
    }
}

impl fmt::Debug for Preprocess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hook(_) => f.write_str("Preprocess::Hook(..)"),
            Self::Unresolved(name) => f.debug_tuple("Preprocess::Unresolved").field(name).finish(),
        }
    }
}

/// Named hooks selectable with `preprocess = "<name>"`.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: BTreeMap<String, Arc<PreprocessFn>>,
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.hooks.keys()).finish()
    }
}

impl HookRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in hooks.
    ///
    /// - `page-title`: sets `page_title` to `"<page> | <title>"`, or the
    ///   page name alone when no title is configured.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert("page-title", page_title);
        registry
    }

    pub fn insert<F>(&mut self, name: &str, hook: F)
    where
        F: Fn(&mut PageContext, &str, &mut Templating) -> Result<(), String>
            + Send
            + Sync
            + 'static,
    {
        self.hooks.insert(name.to_owned(), Arc::new(hook));
    }

    /// Look up `name`. A missing hook resolves to [`Preprocess::Unresolved`]
    /// so the failure surfaces when a page is rendered.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Preprocess {
        match self.hooks.get(name) {
            Some(hook) => Preprocess::Hook(Arc::clone(hook)),
            None => Preprocess::Unresolved(name.to_owned()),
        }
    }
}

fn page_title(
    context: &mut PageContext,
    _template: &str,
    _templating: &mut Templating,
) -> Result<(), String> {
    let page = context
        .page_name()
        .ok_or_else(|| format!("page {:?} is not in the page list", context.id))?
        .to_owned();
    let title = if context.title.is_empty() {
        page
    } else {
        format!("{page} | {}", context.title)
    };
    context
        .extra
        .insert("page_title".to_owned(), serde_json::Value::String(title));
    Ok(())
}
