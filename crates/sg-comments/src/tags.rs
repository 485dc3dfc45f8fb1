//! Tag handlers and the registry the parser dispatches to.
//!
//! Each `@tag` line of a documentation comment is handed to the handler
//! registered under its name, which updates the [`SectionDraft`] being
//! collected for the comment. Unknown tags are skipped.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::context::SectionDraft;
use crate::section::Example;

/// A `@name value` tag with any continuation lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    /// Tag name without the `@`.
    pub name: String,
    /// Rest of the tag line, trimmed.
    pub value: String,
    /// Lines following the tag line up to the next tag.
    pub body: String,
    /// 1-based source line of the tag.
    pub line: usize,
}

impl Tag {
    /// Tag value and body joined as one block of text.
    #[must_use]
    pub fn text(&self) -> String {
        match (self.value.is_empty(), self.body.trim().is_empty()) {
            (_, true) => self.value.clone(),
            (true, false) => self.body.trim_end().to_owned(),
            (false, false) => format!("{}\n{}", self.value, self.body.trim_end()),
        }
    }
}

/// Applies one tag to the draft of the section being declared.
pub trait TagHandler: Send + Sync {
    /// Update `draft` from `tag`; the error message is reported with the
    /// tag location.
    fn apply(&self, tag: &Tag, draft: &mut SectionDraft) -> Result<(), String>;
}

impl<F> TagHandler for F
where
    F: Fn(&Tag, &mut SectionDraft) -> Result<(), String> + Send + Sync,
{
    fn apply(&self, tag: &Tag, draft: &mut SectionDraft) -> Result<(), String> {
        self(tag, draft)
    }
}

/// Tag name to handler lookup.
#[derive(Clone, Default)]
pub struct TagRegistry {
    handlers: BTreeMap<String, Arc<dyn TagHandler>>,
}

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

impl TagRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the standard tags: `section`, `sectionof`, `page`,
    /// `order`, `example` and `code`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.insert("section", section_tag);
        registry.insert("sectionof", sectionof_tag);
        registry.insert("page", page_tag);
        registry.insert("order", order_tag);
        registry.insert("example", example_tag);
        registry.insert("code", code_tag);
        registry
    }

    /// Register `handler` for `name`, replacing any previous handler.
    pub fn insert(&mut self, name: &str, handler: impl TagHandler + 'static) {
        self.handlers.insert(name.to_owned(), Arc::new(handler));
    }

    /// Remove the handler for `name`. Returns whether one was registered.
    pub fn remove(&mut self, name: &str) -> bool {
        self.handlers.remove(name).is_some()
    }

    /// Handler registered for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn TagHandler> {
        self.handlers.get(name).map(|handler| &**handler)
    }

    /// Registered tag names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

fn require_value<'a>(tag: &'a Tag, what: &str) -> Result<&'a str, String> {
    if tag.value.is_empty() {
        Err(format!("expected {what}"))
    } else {
        Ok(&tag.value)
    }
}

/// `@section [Name]`; without a name the first description line is used.
fn section_tag(tag: &Tag, draft: &mut SectionDraft) -> Result<(), String> {
    if !tag.value.is_empty() {
        draft.name = Some(tag.value.clone());
        return Ok(());
    }

    let description = std::mem::take(&mut draft.description);
    let mut lines = description.lines().skip_while(|l| l.trim().is_empty());
    let name = lines
        .next()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| "expected a section name or a description".to_owned())?;
    draft.name = Some(name.to_owned());
    draft.description = lines.collect::<Vec<_>>().join("\n");
    Ok(())
}

fn sectionof_tag(tag: &Tag, draft: &mut SectionDraft) -> Result<(), String> {
    draft.parent = Some(require_value(tag, "a parent section name")?.to_owned());
    Ok(())
}

fn page_tag(tag: &Tag, draft: &mut SectionDraft) -> Result<(), String> {
    draft.page = Some(require_value(tag, "a page name")?.to_owned());
    Ok(())
}

fn order_tag(tag: &Tag, draft: &mut SectionDraft) -> Result<(), String> {
    let value = require_value(tag, "a number")?;
    let order = value
        .parse::<i64>()
        .map_err(|_| format!("{value:?} is not a number"))?;
    draft.order = Some(order);
    Ok(())
}

fn example_tag(tag: &Tag, draft: &mut SectionDraft) -> Result<(), String> {
    draft.example = Some(typed_block(tag)?);
    Ok(())
}

fn code_tag(tag: &Tag, draft: &mut SectionDraft) -> Result<(), String> {
    draft.code = Some(typed_block(tag)?);
    Ok(())
}

/// Parse `{lang} first line` plus body into an example; `lang` defaults to html.
fn typed_block(tag: &Tag) -> Result<Example, String> {
    let (lang, rest) = match tag.value.strip_prefix('{') {
        Some(after) => {
            let (lang, rest) = after
                .split_once('}')
                .ok_or_else(|| "unclosed {type}".to_owned())?;
            (lang.trim().to_owned(), rest.trim().to_owned())
        }
        None => ("html".to_owned(), tag.value.clone()),
    };

    let content = Tag {
        value: rest,
        ..tag.clone()
    }
    .text();
    if content.trim().is_empty() {
        return Err("expected content".to_owned());
    }

    Ok(Example {
        content,
        lang: if lang.is_empty() { "html".to_owned() } else { lang },
    })
}
