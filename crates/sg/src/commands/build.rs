//! `sg build` command implementation.

use std::path::PathBuf;

use clap::Args;
use sg_site::{HookRegistry, StyleGuideOptions, StyleGuidePlugin};

use super::CommonArgs;
use crate::error::CliError;
use crate::host::{load_host, write_artifacts};
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Build output directory; chunk files are read from and pages written
    /// to it (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl BuildArgs {
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.common.load_config(self.output_dir)?;
        let options = StyleGuideOptions::from_config(&config, &HookRegistry::with_builtins())?;
        let out_dir = config.assets_resolved.dir.clone();

        output.status("Generator", options.generator);
        output.status("Output", out_dir.display());

        let mut host = load_host(&config.assets_resolved).await?;
        let pages = StyleGuidePlugin::new(options).run(&mut host).await?;
        if pages == 0 {
            output.warning("No pages generated from source files");
            return Ok(());
        }

        for path in write_artifacts(&out_dir, host.emitted()).await? {
            output.status("Wrote", path.display());
        }
        output.finished(format!(
            "{pages} page{} in {}",
            if pages == 1 { "" } else { "s" },
            out_dir.display()
        ));
        Ok(())
    }
}
