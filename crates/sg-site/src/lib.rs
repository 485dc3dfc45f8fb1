//! Style guide page assembly and rendering for SG.
//!
//! A build runs in two phases, driven by [`StyleGuidePlugin`]:
//!
//! 1. **Parse** ([`Signal::PreOutput`]): load the page template and
//!    partials, parse documentation comments from the source files and
//!    assemble one [`RenderJob`] per page.
//! 2. **Render** ([`Signal::Emit`]): merge the host's build assets into
//!    every page, render the pages concurrently and register them with the
//!    host [`Compilation`].
//!
//! # Example
//!
//! ```no_run
//! use sg_site::{MemoryCompilation, StyleGuideOptions, StyleGuidePlugin};
//!
//! # async fn run() -> Result<(), sg_site::BuildError> {
//! let options = StyleGuideOptions::new(vec!["styles/**/*.css".to_owned()]);
//! let mut host = MemoryCompilation::new();
//! let pages = StyleGuidePlugin::new(options).run(&mut host).await?;
//! println!("rendered {pages} pages");
//! # Ok(())
//! # }
//! ```

mod assembler;
mod assets;
mod driver;
mod error;
mod generator;
mod hooks;
mod host;
mod order;
mod page_context;
mod renderer;
mod templating;

pub use assembler::{AssembleOptions, RenderJob, assemble_pages};
pub use assets::{AssetBundle, collect_assets, read_stylesheets};
pub use driver::{BuildDriver, StyleGuidePlugin};
pub use error::BuildError;
pub use generator::{GeneratorKind, ParsedSite, StyleGuideOptions};
pub use hooks::{HookRegistry, Preprocess, PreprocessFn};
pub use host::{Artifact, Compilation, MemoryCompilation, Signal};
pub use order::{Categorized, generate_sort_order, sort_category_by};
pub use page_context::PageContext;
pub use renderer::{RenderedPage, render_page, render_pages};
pub use templating::{DEFAULT_PARTIALS, DEFAULT_TEMPLATE, PAGE_TEMPLATE, Templating};
