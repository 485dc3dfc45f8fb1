//! Rendering of assembled pages to HTML.

use std::sync::Arc;

use sg_comments::Section;
use tokio::task::JoinSet;

use crate::assembler::RenderJob;
use crate::assets::AssetBundle;
use crate::error::BuildError;
use crate::hooks::Preprocess;
use crate::order::sort_category_by;
use crate::page_context::SectionCatalog;
use crate::templating::Templating;

/// A rendered page waiting to be registered with the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPage {
    pub url: String,
    pub html: String,
}

/// Render one page.
///
/// Only root sections stay at the top level; descendants are reached
/// through their parents. Bundle styles and scripts are appended to the
/// page's own, then the preprocess hook runs once before the job's
/// template is rendered. The hook works on a copy of the environment, so
/// partials it registers apply to this page only.
pub fn render_page(
    job: RenderJob,
    bundle: &AssetBundle,
    templating: &Templating,
) -> Result<RenderedPage, BuildError> {
    let RenderJob {
        url,
        template,
        mut context,
        preprocess,
    } = job;

    let catalog = SectionCatalog::new(&context.sections);
    context.sections.retain(Section::is_root);
    if !context.section_order.is_empty() {
        sort_category_by(&mut context.sections, &context.section_order);
    }

    let hook = match preprocess {
        Some(Preprocess::Unresolved(name)) => {
            return Err(BuildError::Config(format!(
                "preprocess hook {name:?} is not registered"
            )));
        }
        Some(Preprocess::Hook(hook)) => Some(hook),
        None => None,
    };

    context
        .parsed_stylesheets
        .extend(bundle.styles.iter().cloned());
    context.scripts.extend(bundle.scripts.iter().cloned());

    let html = match hook {
        Some(hook) => {
            let mut scoped = templating.clone();
            hook(&mut context, &template, &mut scoped).map_err(|message| {
                BuildError::Preprocess {
                    page: context.id.clone(),
                    message,
                }
            })?;
            scoped.render_template(&template, context.template_data(&catalog))?
        }
        None => templating.render_template(&template, context.template_data(&catalog))?,
    };
    tracing::debug!(url = %url, bytes = html.len(), "Rendered page");
    Ok(RenderedPage { url, html })
}

/// Render every job concurrently, one blocking task per page.
///
/// The first failure cancels the remaining renders. Pages are returned in
/// job order.
pub async fn render_pages(
    jobs: Vec<RenderJob>,
    bundle: Arc<AssetBundle>,
    templating: Arc<Templating>,
) -> Result<Vec<RenderedPage>, BuildError> {
    let mut tasks = JoinSet::new();
    for (index, job) in jobs.into_iter().enumerate() {
        let bundle = Arc::clone(&bundle);
        let templating = Arc::clone(&templating);
        tasks.spawn_blocking(move || {
            render_page(job, &bundle, &templating).map(|page| (index, page))
        });
    }

    let mut pages = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        let result = joined
            .map_err(|e| BuildError::Task(e.to_string()))
            .and_then(|rendered| rendered);
        match result {
            Ok(page) => pages.push(page),
            Err(e) => {
                tasks.abort_all();
                return Err(e);
            }
        }
    }

    pages.sort_by_key(|(index, _)| *index);
    Ok(pages.into_iter().map(|(_, page)| page).collect())
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use sg_comments::{
        AccumulatedContext, ContextBuilder, ContextDefaults, SectionDraft, SourceLocation,
    };

    use super::*;
    use crate::assembler::{AssembleOptions, assemble_pages};
    use crate::hooks::HookRegistry;
    use crate::page_context::PageContext;
    use crate::templating::DEFAULT_TEMPLATE;

    const LIST_TEMPLATE: &str = "{% for s in sections %}[{{ s.id }}\
        {% for c in s.children %}/{{ c.id }}{% endfor %}]{% endfor %}";

    fn templating(source: &str) -> Templating {
        let mut templating = Templating::new();
        templating.set_page_template(source).unwrap();
        templating
    }

    fn context(drafts: &[(&str, Option<&str>)]) -> AccumulatedContext {
        let mut builder = ContextBuilder::default();
        for (line, (name, parent)) in drafts.iter().enumerate() {
            builder
                .add_section(
                    SectionDraft {
                        name: Some((*name).to_owned()),
                        parent: parent.map(str::to_owned),
                        ..SectionDraft::default()
                    },
                    SourceLocation::new("a.css", line + 1),
                )
                .unwrap();
        }
        builder.snapshot()
    }

    fn job(context: PageContext, template: &str) -> RenderJob {
        RenderJob {
            url: "styleguide/index.html".to_owned(),
            template: Arc::from(template),
            context,
            preprocess: None,
        }
    }

    fn empty_job(template: &str) -> RenderJob {
        job(PageContext::from_shared(&context(&[])), template)
    }

    fn single_job(drafts: &[(&str, Option<&str>)], template: &str) -> RenderJob {
        let options = AssembleOptions {
            dest: "styleguide".to_owned(),
            template: Arc::from(template),
            ..AssembleOptions::default()
        };
        assemble_pages(context(drafts), &options)
            .unwrap()
            .remove(0)
    }

    #[test]
    fn only_roots_at_top_level() {
        let job = single_job(
            &[
                ("Buttons", None),
                ("Primary", Some("Buttons")),
                ("Forms", None),
                ("Inputs", Some("Forms")),
            ],
            LIST_TEMPLATE,
        );

        let page = render_page(job, &AssetBundle::default(), &templating(LIST_TEMPLATE)).unwrap();

        assert_eq!(page.html, "[buttons/primary][forms/inputs]");
    }

    #[test]
    fn section_order_applies_to_roots() {
        let mut job = single_job(
            &[("Alpha", None), ("Beta", None), ("Gamma", None)],
            LIST_TEMPLATE,
        );
        job.context.section_order = vec!["Gamma".to_owned()];

        let page = render_page(job, &AssetBundle::default(), &templating(LIST_TEMPLATE)).unwrap();

        assert_eq!(page.html, "[gamma][alpha][beta]");
    }

    #[test]
    fn job_template_is_rendered() {
        let environment = templating("ENV");

        let page = render_page(empty_job("JOB"), &AssetBundle::default(), &environment).unwrap();

        assert_eq!(page.html, "JOB");
    }

    #[test]
    fn job_template_can_include_partials() {
        let mut environment = templating("ENV");
        environment.register_partial("badge", "<b>{{ id }}</b>").unwrap();
        let mut job = empty_job("JOB {% include \"badge\" %}");
        job.context.id = "forms".to_owned();

        let page = render_page(job, &AssetBundle::default(), &environment).unwrap();

        assert_eq!(page.html, "JOB <b>forms</b>");
    }

    #[test]
    fn bundle_appended_after_existing_entries() {
        let mut page_context = PageContext::from_shared(&context(&[]));
        page_context.parsed_stylesheets = vec!["base{}".to_owned()];
        page_context.scripts = vec!["/vendor.js".to_owned()];
        let bundle = AssetBundle {
            styles: vec!["app{}".to_owned()],
            scripts: vec!["/app.js".to_owned()],
        };
        let source = "{{ parsed_stylesheets|join(',') }} {{ scripts|join(',') }}";

        let page = render_page(job(page_context, source), &bundle, &templating(source)).unwrap();

        assert_eq!(page.html, "base{},app{} /vendor.js,/app.js");
    }

    #[test]
    fn unresolved_hook_is_config_error() {
        let mut job = empty_job("x");
        job.preprocess = Some(Preprocess::Unresolved("nope".to_owned()));

        let err = render_page(job, &AssetBundle::default(), &templating("x")).unwrap_err();

        assert!(matches!(err, BuildError::Config(message) if message.contains("nope")));
    }

    #[test]
    fn hook_sees_assets_and_runs_before_render() {
        let source = "{{ summary }}";
        let mut job = empty_job(source);
        job.preprocess = Some(Preprocess::hook(|context, template, _| {
            let summary = format!("{}:{}", context.scripts.len(), template.len());
            context
                .extra
                .insert("summary".to_owned(), serde_json::Value::String(summary));
            Ok(())
        }));
        let bundle = AssetBundle {
            styles: Vec::new(),
            scripts: vec!["/app.js".to_owned()],
        };

        let page = render_page(job, &bundle, &templating(source)).unwrap();

        assert_eq!(page.html, format!("1:{}", source.len()));
    }

    #[test]
    fn hook_partials_stay_with_their_page() {
        let source = "[{% include \"badge\" ignore missing %}]";
        let environment = templating(source);
        let mut with_hook = empty_job(source);
        with_hook.preprocess = Some(Preprocess::hook(|_, _, templating| {
            templating
                .register_partial("badge", "new")
                .map_err(|e| e.to_string())
        }));

        let hooked = render_page(with_hook, &AssetBundle::default(), &environment).unwrap();
        let plain = render_page(empty_job(source), &AssetBundle::default(), &environment).unwrap();

        assert_eq!(hooked.html, "[new]");
        assert_eq!(plain.html, "[]");
    }

    #[test]
    fn hook_failure_names_page() {
        let mut failing = empty_job("x");
        failing.context.id = "forms".to_owned();
        failing.preprocess = Some(Preprocess::hook(|_, _, _| Err("boom".to_owned())));

        let err = render_page(failing, &AssetBundle::default(), &templating("x")).unwrap_err();

        assert!(matches!(
            err,
            BuildError::Preprocess { page, message } if page == "forms" && message == "boom"
        ));
    }

    #[test]
    fn bundled_template_uses_page_title() {
        let mut builder = ContextBuilder::new(ContextDefaults {
            title: "Acme".to_owned(),
            ..ContextDefaults::default()
        });
        builder
            .add_section(
                SectionDraft {
                    name: Some("Inputs".to_owned()),
                    page: Some("Forms".to_owned()),
                    ..SectionDraft::default()
                },
                SourceLocation::new("a.css", 1),
            )
            .unwrap();
        let shared = builder.snapshot();
        let templating = Templating::bundled().unwrap();
        let options = AssembleOptions {
            dest: "styleguide".to_owned(),
            template: Arc::from(DEFAULT_TEMPLATE),
            preprocess: Some(HookRegistry::with_builtins().resolve("page-title")),
            ..AssembleOptions::default()
        };
        let plain_options = AssembleOptions {
            preprocess: None,
            ..options.clone()
        };

        let titled = assemble_pages(shared.clone(), &options).unwrap().remove(0);
        let plain = assemble_pages(shared, &plain_options).unwrap().remove(0);
        let titled = render_page(titled, &AssetBundle::default(), &templating).unwrap();
        let plain = render_page(plain, &AssetBundle::default(), &templating).unwrap();

        assert!(titled.html.contains("<title>Forms | Acme</title>"));
        assert!(plain.html.contains("<title>Acme</title>"));
    }

    #[tokio::test]
    async fn render_pages_keeps_job_order() {
        let source = "<p>{{ id }}</p>";
        let jobs: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|id| {
                let mut page_context = PageContext::from_shared(&context(&[]));
                page_context.id = (*id).to_owned();
                RenderJob {
                    url: format!("{id}.html"),
                    ..job(page_context, source)
                }
            })
            .collect();

        let pages = render_pages(
            jobs,
            Arc::new(AssetBundle::default()),
            Arc::new(templating(source)),
        )
        .await
        .unwrap();

        let urls: Vec<_> = pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["a.html", "b.html", "c.html", "d.html"]);
        assert_eq!(pages[2].html, "<p>c</p>");
    }

    #[tokio::test]
    async fn hook_runs_once_per_page() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let preprocess = Preprocess::hook(move |_, _, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let jobs: Vec<_> = (0..5)
            .map(|i| RenderJob {
                url: format!("{i}.html"),
                preprocess: Some(preprocess.clone()),
                ..empty_job("x")
            })
            .collect();

        let pages = render_pages(
            jobs,
            Arc::new(AssetBundle::default()),
            Arc::new(templating("x")),
        )
        .await
        .unwrap();

        assert_eq!(pages.len(), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn render_pages_fails_fast() {
        let ok = empty_job("x");
        let mut bad = ok.clone();
        bad.preprocess = Some(Preprocess::Unresolved("missing".to_owned()));

        let err = render_pages(
            vec![ok, bad],
            Arc::new(AssetBundle::default()),
            Arc::new(templating("x")),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BuildError::Config(_)));
    }

    #[test]
    fn repeated_render_is_identical() {
        let job = single_job(
            &[("Buttons", None), ("Primary", Some("Buttons"))],
            DEFAULT_TEMPLATE,
        );
        let templating = Templating::bundled().unwrap();

        let first = render_page(job.clone(), &AssetBundle::default(), &templating).unwrap();
        let second = render_page(job, &AssetBundle::default(), &templating).unwrap();

        assert_eq!(first, second);
        assert!(first.html.contains("Primary"));
    }
}
