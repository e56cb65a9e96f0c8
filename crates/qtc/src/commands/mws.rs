//! Mws command - socket gateway messaging.

use anyhow::Result;
use clap::{Args, Subcommand};
use qtc_client::{Mws, Receivers};

use super::{Context, parse_json, print_json};

/// Arguments for the mws command.
#[derive(Args, Debug)]
pub struct MwsArgs {
    #[command(subcommand)]
    pub command: MwsCommand,
}

#[derive(Subcommand, Debug)]
pub enum MwsCommand {
    /// Get a WebSocket address for a new client
    Address,

    /// Send a JSON message; without receivers it goes to every socket
    Send {
        /// Message data as JSON
        data: String,

        /// Receiving socket id (repeatable)
        #[arg(long = "socket")]
        sockets: Vec<String>,

        /// Receiving socket tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
}

fn receivers(sockets: Vec<String>, tags: Vec<String>) -> Receivers {
    if sockets.is_empty() && tags.is_empty() {
        Receivers::everyone()
    } else {
        Receivers { sockets, tags }
    }
}

/// Run the mws command.
pub async fn run(args: MwsArgs, ctx: &Context) -> Result<()> {
    let mws = Mws::new(ctx.config.mws()?)?;
    let opts = ctx.call_options();

    match args.command {
        MwsCommand::Address => print_json(&mws.get_socket_address(opts).await?),
        MwsCommand::Send {
            data,
            sockets,
            tags,
        } => {
            let data = parse_json(&data, "message data")?;
            let sent = mws
                .send_message(&data, &receivers(sockets, tags), opts)
                .await?;
            print_json(&sent)
        }
    }
}
