//! Two-phase build driver bound to the host lifecycle.
//!
//! The parse phase runs before the host produces output; the render phase
//! runs at the host's emit stage and registers one artifact per page.

use std::sync::Arc;

use crate::error::BuildError;
use crate::generator::{ParsedSite, StyleGuideOptions};
use crate::host::{Artifact, Compilation, Signal};

#[derive(Debug)]
enum Phase {
    Idle,
    Parsed(Arc<ParsedSite>),
    Failed,
    Rendered,
}

/// Runs the parse and render phases of one build in order.
#[derive(Debug)]
pub struct BuildDriver {
    options: StyleGuideOptions,
    phase: Phase,
}

impl BuildDriver {
    #[must_use]
    pub fn new(options: StyleGuideOptions) -> Self {
        Self {
            options,
            phase: Phase::Idle,
        }
    }

    #[must_use]
    pub fn options(&self) -> &StyleGuideOptions {
        &self.options
    }

    /// Parse sources and assemble pages.
    ///
    /// A failure leaves the driver unable to render until a later parse
    /// succeeds.
    pub async fn parse_phase(&mut self) -> Result<Arc<ParsedSite>, BuildError> {
        tracing::info!(generator = %self.options.generator, "Parse phase");
        match self.options.generator.build(&self.options).await {
            Ok(site) => {
                let site = Arc::new(site);
                self.phase = Phase::Parsed(Arc::clone(&site));
                Ok(site)
            }
            Err(e) => {
                self.phase = Phase::Failed;
                Err(e)
            }
        }
    }

    /// Render every page and register it with `compilation`.
    ///
    /// Artifacts are registered only once every page rendered. Returns the
    /// number of pages.
    pub async fn render_phase(
        &mut self,
        compilation: &mut dyn Compilation,
    ) -> Result<usize, BuildError> {
        let Phase::Parsed(site) = &self.phase else {
            return Err(BuildError::PhaseOrder);
        };
        let site = Arc::clone(site);
        tracing::info!(pages = site.jobs.len(), "Render phase");

        let pages = match self
            .options
            .generator
            .render(&site, &self.options, &*compilation)
            .await
        {
            Ok(pages) => pages,
            Err(e) => {
                self.phase = Phase::Failed;
                return Err(e);
            }
        };

        for page in &pages {
            tracing::debug!(url = %page.url, "Emitting page");
            compilation.emit_asset(&page.url, Artifact::new(page.html.clone()));
        }
        self.phase = Phase::Rendered;
        Ok(pages.len())
    }
}

/// Host binding: dispatches lifecycle signals to the build phases.
#[derive(Debug)]
pub struct StyleGuidePlugin {
    driver: BuildDriver,
}

impl StyleGuidePlugin {
    #[must_use]
    pub fn new(options: StyleGuideOptions) -> Self {
        Self {
            driver: BuildDriver::new(options),
        }
    }

    /// Handle one host signal.
    pub async fn handle(
        &mut self,
        signal: Signal,
        compilation: &mut dyn Compilation,
    ) -> Result<(), BuildError> {
        match signal {
            Signal::PreOutput => self.driver.parse_phase().await.map(|_| ()),
            Signal::Emit => self.driver.render_phase(compilation).await.map(|_| ()),
        }
    }

    /// Run both phases against `compilation`, returning the page count.
    pub async fn run(&mut self, compilation: &mut dyn Compilation) -> Result<usize, BuildError> {
        self.handle(Signal::PreOutput, compilation).await?;
        self.driver.render_phase(compilation).await
    }
}
