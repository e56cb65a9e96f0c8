//! Mar command - application runtime instance.

use anyhow::Result;
use clap::{Args, Subcommand};
use qtc_client::Mar;

use super::{Context, print_json};

/// Arguments for the mar command.
#[derive(Args, Debug)]
pub struct MarArgs {
    #[command(subcommand)]
    pub command: MarCommand,
}

#[derive(Subcommand, Debug)]
pub enum MarCommand {
    /// Show instance information
    Info,

    /// Show application logs
    Logs {
        /// Maximum lines to return
        #[arg(short, long)]
        limit: Option<u64>,

        /// Lines to skip
        #[arg(long)]
        offset: Option<u64>,
    },

    /// Show custom environment variables
    Env,
}

/// Run the mar command.
pub async fn run(args: MarArgs, ctx: &Context) -> Result<()> {
    let mut config = ctx.config.mar()?;
    if let Some(token) = &ctx.token {
        config.secret = Some(token.clone());
    }
    let mar = Mar::new(config)?;

    let result = match args.command {
        MarCommand::Info => mar.get_instance_info().await?,
        MarCommand::Logs { limit, offset } => mar.get_logs(limit, offset).await?,
        MarCommand::Env => mar.get_env_vars().await?,
    };
    print_json(&result)
}
