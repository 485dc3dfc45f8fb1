//! Configuration management for SG.
//!
//! Parses `sg.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `styleguide.dest`
//! - `context.title`
//! - `context.footer_html`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override source globs.
    pub source: Option<Vec<String>>,
    /// Override the style guide destination prefix.
    pub dest: Option<String>,
    /// Override the build output directory.
    pub output_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "sg.toml";

/// Default destination prefix for generated pages.
pub const DEFAULT_DEST: &str = "styleguide";

/// Default generator name.
pub const DEFAULT_GENERATOR: &str = "livingcss";

/// Application configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Style guide configuration (paths are relative strings from TOML).
    styleguide: StyleguideConfigRaw,
    /// Defaults for the shared page context.
    pub context: ContextConfig,
    /// Host build output configuration.
    assets: AssetsConfigRaw,

    /// Resolved style guide configuration (set after loading).
    #[serde(skip)]
    pub styleguide_resolved: StyleguideConfig,
    /// Resolved host build output configuration (set after loading).
    #[serde(skip)]
    pub assets_resolved: AssetsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// One or many glob patterns.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Patterns {
    One(String),
    Many(Vec<String>),
}

impl Patterns {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(pattern) => vec![pattern],
            Self::Many(patterns) => patterns,
        }
    }
}

/// Entry of the explicit page order.
///
/// Either a bare page name, or a single-key table mapping a page name to the
/// order of its root sections:
///
/// ```toml
/// sort_order = ["forms", { buttons = ["Primary", "Ghost"] }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SortOrderEntry {
    /// Page name only.
    Page(String),
    /// Page name with the order of its root sections.
    WithSections(BTreeMap<String, Vec<String>>),
}

impl SortOrderEntry {
    /// Page names referenced by this entry.
    pub fn pages(&self) -> Vec<&str> {
        match self {
            Self::Page(name) => vec![name.as_str()],
            Self::WithSections(map) => map.keys().map(String::as_str).collect(),
        }
    }
}

/// Tag registry overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TagsConfig {
    /// Tags to remove from the default registry.
    pub disabled: Vec<String>,
}

/// Raw style guide configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StyleguideConfigRaw {
    generator: Option<String>,
    source: Option<Patterns>,
    dest: Option<String>,
    template: Option<String>,
    partials: Option<String>,
    sort_order: Vec<SortOrderEntry>,
    chunks: Vec<String>,
    preprocess: Option<String>,
    extra_styles: Vec<String>,
    tags: TagsConfig,
}

/// Resolved style guide configuration with absolute paths.
#[derive(Debug, Clone)]
pub struct StyleguideConfig {
    /// Generator name (e.g. "livingcss").
    pub generator: String,
    /// Absolute glob patterns of files to parse.
    pub source: Vec<String>,
    /// Destination prefix of generated pages inside the build output.
    pub dest: String,
    /// Page template path. `None` uses the bundled template.
    pub template: Option<PathBuf>,
    /// Absolute glob pattern of partial templates. `None` uses the bundled partials.
    pub partials: Option<String>,
    /// Explicit page order.
    pub sort_order: Vec<SortOrderEntry>,
    /// Host chunk names whose outputs are included in every page.
    pub chunks: Vec<String>,
    /// Name of the page context hook to run before compilation.
    pub preprocess: Option<String>,
    /// Literal CSS appended after the chunk styles.
    pub extra_styles: Vec<String>,
    /// Tag registry overrides.
    pub tags: TagsConfig,
}

impl Default for StyleguideConfig {
    fn default() -> Self {
        Self {
            generator: DEFAULT_GENERATOR.to_owned(),
            source: Vec::new(),
            dest: DEFAULT_DEST.to_owned(),
            template: None,
            partials: None,
            sort_order: Vec::new(),
            chunks: Vec::new(),
            preprocess: None,
            extra_styles: Vec::new(),
            tags: TagsConfig::default(),
        }
    }
}

/// Defaults for the shared page context.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Page title.
    pub title: String,
    /// HTML placed in the page footer.
    pub footer_html: String,
    /// HTML of the navigation menu toggle.
    pub menu_button_html: String,
    /// Stylesheet URLs linked from every page.
    pub global_stylesheets: Vec<String>,
    /// Stylesheet files whose contents are inlined into example previews.
    pub stylesheets: Vec<PathBuf>,
    /// Script URLs included in every page.
    pub scripts: Vec<String>,
}

impl Default for ContextConfig {
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

/// Raw host build output configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AssetsConfigRaw {
    dir: Option<String>,
    chunks: BTreeMap<String, Patterns>,
}

/// Resolved host build output configuration.
#[derive(Debug, Clone, Default)]
pub struct AssetsConfig {
    /// Directory holding the compiled build outputs; pages are written here too.
    pub dir: PathBuf,
    /// Chunk name to output files, relative to `dir`.
    pub chunks: BTreeMap<String, Vec<String>>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`context.title`").
        field: String,
        /// Error message (e.g., "${`SG_TITLE`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `sg.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from a TOML string, resolving paths against `base`.
    pub fn from_toml_str(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source) = &settings.source {
            self.styleguide_resolved.source.clone_from(source);
        }
        if let Some(dest) = &settings.dest {
            self.styleguide_resolved.dest.clone_from(dest);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.assets_resolved.dir.clone_from(output_dir);
        }
    }

    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        let mut config = Self::default();
        config.resolve_paths(base);
        config
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml_str(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file. A missing `source` is
    /// not rejected here: it may still be supplied on the command line.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.styleguide_resolved.generator, "styleguide.generator")?;
        for pattern in &self.styleguide_resolved.source {
            require_non_empty(pattern, "styleguide.source")?;
        }
        for chunk in &self.styleguide_resolved.chunks {
            require_non_empty(chunk, "styleguide.chunks")?;
        }
        for entry in &self.styleguide_resolved.sort_order {
            if let SortOrderEntry::WithSections(map) = entry
                && map.len() != 1
            {
                return Err(ConfigError::Validation(
                    "styleguide.sort_order tables must name exactly one page".to_owned(),
                ));
            }
            for page in entry.pages() {
                require_non_empty(page, "styleguide.sort_order")?;
            }
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(dest) = &mut self.styleguide.dest {
            expand::expand_in_place(dest, "styleguide.dest")?;
        }
        expand::expand_in_place(&mut self.context.title, "context.title")?;
        expand::expand_in_place(&mut self.context.footer_html, "context.footer_html")?;
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let glob_in_dir = |pattern: &str| config_dir.join(pattern).to_string_lossy().into_owned();
        let raw = &self.styleguide;

        self.styleguide_resolved = StyleguideConfig {
            generator: raw
                .generator
                .clone()
                .unwrap_or_else(|| DEFAULT_GENERATOR.to_owned()),
            source: raw
                .source
                .clone()
                .map(Patterns::into_vec)
                .unwrap_or_default()
                .iter()
                .map(|p| glob_in_dir(p))
                .collect(),
            dest: raw.dest.clone().unwrap_or_else(|| DEFAULT_DEST.to_owned()),
            template: raw.template.as_deref().map(|t| config_dir.join(t)),
            partials: raw.partials.as_deref().map(glob_in_dir),
            sort_order: raw.sort_order.clone(),
            chunks: raw.chunks.clone(),
            preprocess: raw.preprocess.clone(),
            extra_styles: raw.extra_styles.clone(),
            tags: raw.tags.clone(),
        };

        self.context.stylesheets = self
            .context
            .stylesheets
            .iter()
            .map(|s| config_dir.join(s))
            .collect();

        self.assets_resolved = AssetsConfig {
            dir: config_dir.join(self.assets.dir.as_deref().unwrap_or("dist")),
            chunks: self
                .assets
                .chunks
                .iter()
                .map(|(name, files)| (name.clone(), files.clone().into_vec()))
                .collect(),
        };
    }
}
