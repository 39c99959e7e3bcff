//! Profile commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use petnest::{ApiClient, OutboundRequest};

use super::{parse_json_arg, require_session, send_and_print};

#[derive(Args, Debug)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProfileSubcommand {
    /// Show the profile and its pet listings
    Show,

    /// Update profile fields
    Update {
        /// Changed fields as JSON, or @path to a JSON file
        #[arg(long)]
        json: String,
    },
}

pub async fn handle(client: &ApiClient, cmd: ProfileCommand) -> Result<()> {
    require_session(client).await?;

    let request = match cmd.command {
        ProfileSubcommand::Show => OutboundRequest::get("/profile"),
        ProfileSubcommand::Update { json } => {
            OutboundRequest::patch("/profile").json(&parse_json_arg(&json)?)?
        }
    };

    send_and_print(client, request, "Profile updated").await
}
