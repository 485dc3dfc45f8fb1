//! SG CLI - Style guide generator.
//!
//! Provides commands for:
//! - `build`: Render the style guide into the build output directory
//! - `check`: Parse sources and report pages without rendering

mod commands;
mod error;
mod host;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, CheckArgs};
use error::CliError;
use output::Output;

/// SG - Style guide generator.
#[derive(Parser)]
#[command(name = "sg", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the style guide.
    Build(BuildArgs),
    /// Parse sources and list the pages that would be built.
    Check(CheckArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Build(args) => args.common.verbose,
            Self::Check(args) => args.common.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli.command) {
        output.error(format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    let rt = tokio::runtime::Runtime::new()?;
    match command {
        Commands::Build(args) => rt.block_on(args.execute()),
        Commands::Check(args) => rt.block_on(args.execute()),
    }
}
