//! Pet listing commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use petnest::{ApiClient, OutboundRequest};

use super::{parse_json_arg, require_session, send_and_print};

#[derive(Args, Debug)]
pub struct PetsCommand {
    #[command(subcommand)]
    pub command: PetsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PetsSubcommand {
    /// List pets
    List,

    /// Fetch a single pet
    Get {
        /// Pet ID
        id: String,
    },

    /// Create a pet listing
    Create {
        /// Pet fields as JSON, or @path to a JSON file
        #[arg(long)]
        json: String,
    },

    /// Update fields of a pet listing
    Update {
        /// Pet ID
        id: String,

        /// Changed fields as JSON, or @path to a JSON file
        #[arg(long)]
        json: String,
    },

    /// Replace the media attached to a pet
    SetMedia {
        /// Pet ID
        id: String,

        /// Media list as JSON (`{"media": [...]}`), or @path to a JSON file
        #[arg(long)]
        json: String,
    },

    /// Delete a pet listing
    Delete {
        /// Pet ID
        id: String,
    },
}

fn pet_path(id: &str) -> String {
    format!("/pets/{}", id)
}

pub async fn handle(client: &ApiClient, cmd: PetsCommand) -> Result<()> {
    require_session(client).await?;

    let request = match cmd.command {
        PetsSubcommand::List => OutboundRequest::get("/pets"),
        PetsSubcommand::Get { id } => OutboundRequest::get(pet_path(&id)),
        PetsSubcommand::Create { json } => {
            OutboundRequest::post("/pets").json(&parse_json_arg(&json)?)?
        }
        PetsSubcommand::Update { id, json } => {
            OutboundRequest::patch(pet_path(&id)).json(&parse_json_arg(&json)?)?
        }
        PetsSubcommand::SetMedia { id, json } => {
            OutboundRequest::put(format!("{}/media", pet_path(&id))).json(&parse_json_arg(&json)?)?
        }
        PetsSubcommand::Delete { id } => OutboundRequest::delete(pet_path(&id)),
    };

    send_and_print(client, request, "Done").await
}
