//! Style guide generators.
//!
//! A generator turns source files into render jobs (`build`) and render
//! jobs into pages (`render`). The parse work of `build` fans out over
//! template loading, partial loading and comment parsing.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use sg_comments::{CommentParser, ContextBuilder, ContextDefaults, DocBlockParser, TagRegistry};
use sg_config::{Config, SortOrderEntry};
use tokio::task::JoinSet;

use crate::assembler::{AssembleOptions, RenderJob, assemble_pages};
use crate::assets::{collect_assets, read_stylesheets};
use crate::error::BuildError;
use crate::hooks::{HookRegistry, Preprocess};
use crate::host::Compilation;
use crate::renderer::{RenderedPage, render_pages};
use crate::templating::{DEFAULT_PARTIALS, DEFAULT_TEMPLATE, Templating};

/// Available generators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GeneratorKind {
    /// Pages from `/** */` documentation comments.
    #[default]
    LivingCss,
    /// Accepts the same options but produces no pages.
    Blueprint,
}

impl GeneratorKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::LivingCss => "livingcss",
            Self::Blueprint => "blueprint",
        }
    }

    /// Parse sources and assemble render jobs.
    pub async fn build(self, options: &StyleGuideOptions) -> Result<ParsedSite, BuildError> {
        match self {
            Self::LivingCss => build_livingcss(options).await,
            Self::Blueprint => {
                tracing::info!("Blueprint generator selected, no pages to build");
                Ok(ParsedSite::empty())
            }
        }
    }

    /// Render the jobs of `site` with the host's build assets.
    pub async fn render(
        self,
        site: &ParsedSite,
        options: &StyleGuideOptions,
        compilation: &dyn Compilation,
    ) -> Result<Vec<RenderedPage>, BuildError> {
        if self == Self::Blueprint || site.jobs.is_empty() {
            return Ok(Vec::new());
        }

        let mut bundle = collect_assets(compilation, &options.chunks, &options.extra_styles)?;
        bundle
            .styles
            .extend(read_stylesheets(&options.defaults.stylesheets).await?);

        render_pages(
            site.jobs.clone(),
            Arc::new(bundle),
            Arc::clone(&site.templating),
        )
        .await
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeneratorKind {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "livingcss" => Ok(Self::LivingCss),
            "blueprint" => Ok(Self::Blueprint),
            other => Err(BuildError::Config(format!("unknown generator {other:?}"))),
        }
    }
}

/// Result of a successful parse phase.
#[derive(Debug)]
pub struct ParsedSite {
    /// One job per page, in page order.
    pub jobs: Vec<RenderJob>,
    pub templating: Arc<Templating>,
}

impl ParsedSite {
    fn empty() -> Self {
        Self {
            jobs: Vec::new(),
            templating: Arc::new(Templating::new()),
        }
    }

    /// Number of root and nested sections across all pages.
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.jobs.iter().map(|job| job.context.sections.len()).sum()
    }
}

/// Options of a style guide build.
#[derive(Clone)]
pub struct StyleGuideOptions {
    pub generator: GeneratorKind,
    /// Source glob patterns.
    pub source: Vec<String>,
    /// Output directory prefix of page URLs.
    pub dest: String,
    /// Page template file; the bundled template when `None`.
    pub template: Option<PathBuf>,
    /// Glob of partial files, registered by file stem.
    pub partials: Option<String>,
    pub sort_order: Vec<SortOrderEntry>,
    /// Host chunks whose output is added to every page.
    pub chunks: Vec<String>,
    pub preprocess: Option<Preprocess>,
    /// Literal CSS added after the build styles.
    pub extra_styles: Vec<String>,
    pub tags: TagRegistry,
    pub defaults: ContextDefaults,
    pub parser: Arc<dyn CommentParser>,
}

impl fmt::Debug for StyleGuideOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleGuideOptions")
            .field("generator", &self.generator)
            .field("source", &self.source)
            .field("dest", &self.dest)
            .field("template", &self.template)
            .field("partials", &self.partials)
            .field("chunks", &self.chunks)
            .field("preprocess", &self.preprocess)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

impl StyleGuideOptions {
    /// Options with the default generator, tags and parser.
    #[must_use]
    pub fn new(source: Vec<String>) -> Self {
        Self {
            generator: GeneratorKind::default(),
            source,
            dest: sg_config::DEFAULT_DEST.to_owned(),
            template: None,
            partials: None,
            sort_order: Vec::new(),
            chunks: Vec::new(),
            preprocess: None,
            extra_styles: Vec::new(),
            tags: TagRegistry::with_defaults(),
            defaults: ContextDefaults::default(),
            parser: Arc::new(DocBlockParser),
        }
    }

    /// Options from loaded configuration. `preprocess` is looked up in `hooks`.
    pub fn from_config(config: &Config, hooks: &HookRegistry) -> Result<Self, BuildError> {
        let styleguide = &config.styleguide_resolved;
        let mut tags = TagRegistry::with_defaults();
        for name in &styleguide.tags.disabled {
            if !tags.remove(name) {
                tracing::warn!(tag = %name, "Cannot disable unknown tag");
            }
        }

        Ok(Self {
            generator: styleguide.generator.parse()?,
            dest: styleguide.dest.clone(),
            template: styleguide.template.clone(),
            partials: styleguide.partials.clone(),
            sort_order: styleguide.sort_order.clone(),
            chunks: styleguide.chunks.clone(),
            preprocess: styleguide.preprocess.as_deref().map(|name| hooks.resolve(name)),
            extra_styles: styleguide.extra_styles.clone(),
            tags,
            defaults: ContextDefaults {
                title: config.context.title.clone(),
                footer_html: config.context.footer_html.clone(),
                menu_button_html: config.context.menu_button_html.clone(),
                global_stylesheets: config.context.global_stylesheets.clone(),
                stylesheets: config.context.stylesheets.clone(),
                scripts: config.context.scripts.clone(),
            },
            ..Self::new(styleguide.source.clone())
        })
    }
}

async fn build_livingcss(options: &StyleGuideOptions) -> Result<ParsedSite, BuildError> {
    if options.source.is_empty() {
        return Err(BuildError::Config("no source patterns configured".to_owned()));
    }

    let (template, partials, context) = tokio::try_join!(
        load_template(options.template.as_deref()),
        load_partials(options.partials.as_deref()),
        parse_sources(options),
    )?;

    let mut templating = Templating::new();
    for (name, source) in &partials {
        templating.register_partial(name, source)?;
    }
    templating.set_page_template(&template)?;

    let assemble = AssembleOptions {
        dest: options.dest.clone(),
        sort_order: options.sort_order.clone(),
        template: Arc::from(template),
        preprocess: options.preprocess.clone(),
    };
    let jobs = assemble_pages(context, &assemble)?;
    tracing::info!(pages = jobs.len(), "Parsed style guide");

    Ok(ParsedSite {
        jobs,
        templating: Arc::new(templating),
    })
}

async fn load_template(path: Option<&Path>) -> Result<String, BuildError> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading page template");
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| BuildError::io(path, e))
        }
        None => Ok(DEFAULT_TEMPLATE.to_owned()),
    }
}

/// Bundled partials, then those matching `pattern`; a file partial replaces
/// a bundled one of the same name.
async fn load_partials(pattern: Option<&str>) -> Result<Vec<(String, String)>, BuildError> {
    let mut partials: Vec<(String, String)> = DEFAULT_PARTIALS
        .iter()
        .map(|(name, source)| ((*name).to_owned(), (*source).to_owned()))
        .collect();

    let Some(pattern) = pattern else {
        return Ok(partials);
    };

    for path in expand_patterns(&[pattern.to_owned()])? {
        let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| BuildError::io(&path, e))?;
        tracing::debug!(partial = %name, "Loaded partial");
        partials.push((name, source));
    }
    Ok(partials)
}

async fn parse_sources(
    options: &StyleGuideOptions,
) -> Result<sg_comments::AccumulatedContext, BuildError> {
    let files = expand_patterns(&options.source)?;
    if files.is_empty() {
        tracing::warn!(patterns = ?options.source, "No source files matched");
    }

    let mut reads = JoinSet::new();
    for (index, path) in files.iter().cloned().enumerate() {
        reads.spawn(async move {
            let source = tokio::fs::read_to_string(&path).await;
            (index, path, source)
        });
    }

    let mut sources: Vec<Option<String>> = vec![None; files.len()];
    while let Some(joined) = reads.join_next().await {
        let (index, path, source) = joined.map_err(|e| BuildError::Task(e.to_string()))?;
        sources[index] = Some(source.map_err(|e| BuildError::io(path, e))?);
    }

    let mut builder = ContextBuilder::new(options.defaults.clone());
    for (path, source) in files.iter().zip(sources) {
        let Some(source) = source else { continue };
        tracing::debug!(file = %path.display(), "Parsing source");
        options
            .parser
            .parse(&source, path, &options.tags, &mut builder)?;
    }
    tracing::debug!(
        files = files.len(),
        sections = builder.section_count(),
        "Parsed sources"
    );
    Ok(builder.snapshot())
}

/// Expand glob patterns into a sorted, deduplicated file list.
fn expand_patterns(patterns: &[String]) -> Result<BTreeSet<PathBuf>, BuildError> {
    let mut files = BTreeSet::new();
    for pattern in patterns {
        let paths = glob::glob(pattern)
            .map_err(|e| BuildError::Config(format!("invalid pattern {pattern:?}: {e}")))?;
        for entry in paths {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                BuildError::io(path, e.into_error())
            })?;
            if path.is_file() {
                files.insert(path);
            }
        }
    }
    Ok(files)
}
