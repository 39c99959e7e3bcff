//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::auth::{LoginArgs, RegisterArgs};
use crate::commands::pets::PetsCommand;
use crate::commands::profile::ProfileCommand;
use crate::commands::upload::UploadArgs;

/// CLI tool for the petnest adoption backend.
#[derive(Parser, Debug)]
#[command(name = "petnest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Backend base URL
    #[arg(long, env = "PETNEST_API_BASE", global = true)]
    pub api_base: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and cache the access token
    Login(LoginArgs),

    /// Create a new account
    Register(RegisterArgs),

    /// End the session and forget the cached token
    Logout,

    /// Show the identity behind the current session
    Whoami,

    /// Exchange the refresh cookie for a new access token
    Refresh,

    /// Pet listings
    Pets(PetsCommand),

    /// The signed-in user's profile
    Profile(ProfileCommand),

    /// Upload a media file
    Upload(UploadArgs),
}
