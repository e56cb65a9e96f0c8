//! qtc - Qt Cloud Services from the command line
//!
//! Main entry point for the qtc CLI.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

mod commands;

use commands::{eds, mar, mws, platform};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// qtc - Qt Cloud Services from the command line
#[derive(Parser)]
#[command(name = "qtc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (logs every request to stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: $QTC_CONFIG or ~/.qtcrc)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Access token sent instead of the configured secret
    #[arg(long, global = true, env = "QTC_TOKEN")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Data store (EDS) objects and files
    Eds(eds::EdsArgs),

    /// Socket gateway (MWS) messaging
    Mws(mws::MwsArgs),

    /// Application runtime (MAR) instance
    Mar(mar::MarArgs),

    /// Account platform: user, clouds and instances
    Platform(platform::PlatformArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "qtc=debug,qtc_client=debug,qtc_config=debug,info"
    } else {
        "qtc=info,qtc_client=info,warn"
    };

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => qtc_config::load_config_from(path),
        None => qtc_config::load_config(),
    }
    .context("failed to load configuration")?;
    if cli.verbose {
        config.enable_debug();
    }
    tracing::debug!(path = ?cli.config, "configuration loaded");

    let ctx = commands::Context {
        config,
        token: cli.token,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Eds(args) => eds::run(args, &ctx).await,
        Commands::Mws(args) => mws::run(args, &ctx).await,
        Commands::Mar(args) => mar::run(args, &ctx).await,
        Commands::Platform(args) => platform::run(args, &ctx).await,
    }
}
