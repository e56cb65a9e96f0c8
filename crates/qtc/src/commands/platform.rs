//! Platform command - user, clouds and instances.

use anyhow::Result;
use clap::{Args, Subcommand};
use qtc_client::Platform;

use super::{Context, print_json};

/// Arguments for the platform command.
#[derive(Args, Debug)]
pub struct PlatformArgs {
    #[command(subcommand)]
    pub command: PlatformCommand,
}

#[derive(Subcommand, Debug)]
pub enum PlatformCommand {
    /// Show the signed-in user
    User,

    /// List clouds
    Clouds,

    /// List instances of a cloud
    Instances {
        cloud_id: String,

        /// Only instances of this service provider (eds, mws, mar)
        #[arg(short, long)]
        provider: Option<String>,
    },
}

/// Run the platform command.
pub async fn run(args: PlatformArgs, ctx: &Context) -> Result<()> {
    let mut config = ctx.config.platform();
    config.debug |= ctx.verbose;
    if let Some(token) = &ctx.token {
        config.secret = Some(token.clone());
    }
    let platform = Platform::new(config)?;

    let result = match args.command {
        PlatformCommand::User => platform.get_user().await?,
        PlatformCommand::Clouds => platform.get_clouds().await?,
        PlatformCommand::Instances { cloud_id, provider } => {
            platform
                .get_cloud_instances(&cloud_id, provider.as_deref())
                .await?
        }
    };
    print_json(&result)
}
