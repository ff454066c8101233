//! runmedic - failed workflow run inspection and remediation
//!
//! Main entry point for the runmedic CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod logging;
mod services;

use commands::{config, inspect, serve};
use runmedic_config::LoadedConfig;

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// runmedic - failed workflow run inspection and remediation
#[derive(Parser)]
#[command(name = "runmedic")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file (overrides default discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve(serve::ServeArgs),

    /// Inspect one workflow and print the outcome
    Inspect(inspect::InspectArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = match cli.config {
        Some(ref path) => LoadedConfig::from_file(path)?,
        None => runmedic_config::load_config(None)?,
    };

    let _guard = logging::init(cli.verbose, &loaded.config.logging());

    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }
    for source in loaded.loaded_from() {
        tracing::debug!(path = %source.display(), "Loaded config");
    }

    let ctx = commands::Context {
        loaded,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Serve(args) => serve::run(args, &ctx).await,
        Commands::Inspect(args) => inspect::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
