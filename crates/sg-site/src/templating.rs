//! Template environment shared by every page render.

use std::fmt;
use std::sync::Arc;

use minijinja::{AutoEscape, Environment};
use serde::Serialize;

use crate::error::BuildError;

/// Name the page template is registered under.
pub const PAGE_TEMPLATE: &str = "page";

/// Bundled page template.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/page.html");

/// Bundled partials, by name.
pub const DEFAULT_PARTIALS: &[(&str, &str)] = &[
    ("navbar", include_str!("../templates/partials/navbar.html")),
    ("section", include_str!("../templates/partials/section.html")),
];

/// Compiled page template plus its named partials.
///
/// Output is HTML-escaped unless a value is marked `|safe`.
#[derive(Clone)]
pub struct Templating {
    env: Environment<'static>,
    page_source: Option<Arc<str>>,
}

impl fmt::Debug for Templating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.env.templates().map(|(name, _)| name).collect();
        f.debug_struct("Templating").field("templates", &names).finish()
    }
}

impl Default for Templating {
    fn default() -> Self {
        Self::new()
    }
}

impl Templating {
    /// An environment without templates.
    #[must_use]
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        Self {
            env,
            page_source: None,
        }
    }

    /// An environment holding the bundled template and partials.
    pub fn bundled() -> Result<Self, BuildError> {
        let mut templating = Self::new();
        for (name, source) in DEFAULT_PARTIALS {
            templating.register_partial(name, source)?;
        }
        templating.set_page_template(DEFAULT_TEMPLATE)?;
        Ok(templating)
    }

    /// Register a partial usable as `{% include "name" %}`.
    pub fn register_partial(&mut self, name: &str, source: &str) -> Result<(), BuildError> {
        self.env
            .add_template_owned(name.to_owned(), source.to_owned())?;
        Ok(())
    }

    /// Compile `source` as the page template.
    pub fn set_page_template(&mut self, source: &str) -> Result<(), BuildError> {
        self.register_partial(PAGE_TEMPLATE, source)?;
        self.page_source = Some(Arc::from(source));
        Ok(())
    }

    /// Whether a page template has been compiled.
    #[must_use]
    pub fn has_page_template(&self) -> bool {
        self.env.get_template(PAGE_TEMPLATE).is_ok()
    }

    /// Render the page template.
    pub fn render_page<S: Serialize>(&self, context: S) -> Result<String, BuildError> {
        Ok(self.env.get_template(PAGE_TEMPLATE)?.render(context)?)
    }

    /// Render `source` as a page template.
    ///
    /// Reuses the compiled page template when `source` is its source;
    /// anything else is compiled for this call.
    pub fn render_template<S: Serialize>(
        &self,
        source: &str,
        context: S,
    ) -> Result<String, BuildError> {
        if self.page_source.as_deref() == Some(source) {
            self.render_page(context)
        } else {
            self.render_str(source, context)
        }
    }

    /// Render an ad hoc template string; partials are available to it.
    pub fn render_str<S: Serialize>(&self, source: &str, context: S) -> Result<String, BuildError> {
        Ok(self.env.render_str(source, context)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bundled_environment_has_page_template() {
        let templating = Templating::bundled().unwrap();
        assert!(templating.has_page_template());
        assert!(!Templating::new().has_page_template());
    }

    #[test]
    fn output_is_escaped_unless_safe() {
        let mut templating = Templating::new();
        templating
            .set_page_template("{{ a }}|{{ a|safe }}")
            .unwrap();

        let html = templating.render_page(json!({ "a": "<b>" })).unwrap();

        assert_eq!(html, "&lt;b&gt;|<b>");
    }

    #[test]
    fn partials_are_includable() {
        let mut templating = Templating::new();
        templating.register_partial("greeting", "Hello {{ name }}").unwrap();
        templating
            .set_page_template("{% include \"greeting\" %}!")
            .unwrap();

        let html = templating.render_page(json!({ "name": "sg" })).unwrap();

        assert_eq!(html, "Hello sg!");
    }

    #[test]
    fn syntax_error_reported_on_compile() {
        let mut templating = Templating::new();
        let err = templating.set_page_template("{% if %}").unwrap_err();
        assert!(matches!(err, BuildError::Template(_)));
    }

    #[test]
    fn render_str_sees_partials() {
        let mut templating = Templating::new();
        templating.register_partial("name", "{{ n }}").unwrap();
        let out = templating
            .render_str("[{% include \"name\" %}]", json!({ "n": 1 }))
            .unwrap();
        assert_eq!(out, "[1]");
    }

    #[test]
    fn render_template_uses_given_source() {
        let mut templating = Templating::new();
        templating.register_partial("item", "<{{ n }}>").unwrap();
        templating.set_page_template("ENV").unwrap();

        let own = templating.render_template("ENV", json!({})).unwrap();
        let other = templating
            .render_template("JOB {% include \"item\" %}", json!({ "n": 2 }))
            .unwrap();

        assert_eq!(own, "ENV");
        assert_eq!(other, "JOB <2>");
    }

    #[test]
    fn render_without_page_template_fails() {
        let err = Templating::new().render_page(json!({})).unwrap_err();
        assert!(matches!(err, BuildError::Template(_)));
    }
}
