//! Keypath CLI - watch a key press travel from the switch to the CPU.

mod commands;
mod render;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keypath")]
#[command(author, version, about = "What happens when you press Enter?", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Animate a run in real time
    Run(commands::run::RunArgs),

    /// Print a deterministic offline run
    Trace(commands::trace::TraceArgs),

    /// List built-in and user graphs, or show one
    Graphs(commands::graphs::GraphsArgs),

    /// Check graph files for errors
    Validate(commands::validate::ValidateArgs),

    /// Write a graph as TOML
    Export(commands::export::ExportArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Trace(args) => commands::trace::run(args),
        Commands::Graphs(args) => commands::graphs::run(args),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Export(args) => commands::export::run(args),
    }
}
