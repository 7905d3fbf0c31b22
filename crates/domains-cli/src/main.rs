mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "domains", about = "Membrane domain quantification for time-stack images")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze stacks and export images and domain tables
    Run(commands::run::RunArgs),
    /// List stacks with their derived names and metadata
    Info(commands::info::InfoArgs),
    /// Print or save the default analysis config
    Config(commands::config::ConfigArgs),
}

/// Install the global subscriber. `filter` is an `EnvFilter` directive.
pub(crate) fn init_tracing(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.verbose { "debug" } else { "warn" };

    match &cli.command {
        // The config file may switch on verbose logging, so the subscriber
        // starts once it is loaded.
        Commands::Run(args) => commands::run::run(args, cli.verbose),
        Commands::Info(args) => {
            init_tracing(filter);
            commands::info::run(args)
        }
        Commands::Config(args) => {
            init_tracing(filter);
            commands::config::run(args)
        }
    }
}
