//! `sg check` command implementation.

use clap::Args;
use sg_site::{BuildDriver, HookRegistry, StyleGuideOptions};

use super::CommonArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl CheckArgs {
    /// Run the parse phase only; reference and parse errors fail the command.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.common.load_config(None)?;
        let options = StyleGuideOptions::from_config(&config, &HookRegistry::with_builtins())?;
        let site = BuildDriver::new(options).parse_phase().await?;

        if site.jobs.is_empty() {
            output.warning("No pages generated from source files");
            return Ok(());
        }

        for job in &site.jobs {
            let context = &job.context;
            output.status(
                "Page",
                format!(
                    "{} ({} sections) -> {}",
                    context.page_name().unwrap_or(&context.id),
                    context.sections.len(),
                    job.url
                ),
            );
        }
        output.finished(format!(
            "{} pages, {} sections",
            site.jobs.len(),
            site.section_count()
        ));
        Ok(())
    }
}
