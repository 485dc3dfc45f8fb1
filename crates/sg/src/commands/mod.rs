//! CLI command implementations.

mod build;
mod check;

use std::path::PathBuf;

use clap::Args;
use sg_config::{CliSettings, Config};

pub(crate) use build::BuildArgs;
pub(crate) use check::CheckArgs;

use crate::error::CliError;

/// Arguments shared by every command.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover sg.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source glob pattern; repeatable (overrides config).
    #[arg(short, long = "source", value_name = "PATTERN")]
    source: Vec<String>,

    /// Destination prefix of page URLs (overrides config).
    #[arg(long)]
    dest: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    fn load_config(&self, output_dir: Option<PathBuf>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            source: (!self.source.is_empty()).then(|| self.source.clone()),
            dest: self.dest.clone(),
            output_dir,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}
