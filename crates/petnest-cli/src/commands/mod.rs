//! Command implementations.

pub mod auth;
pub mod pets;
pub mod profile;
pub mod upload;

use std::fs;

use anyhow::{Context, Result, bail};
use petnest::{ApiClient, OutboundRequest, IdentityCheck, SessionGate};
use serde_json::Value;
use tracing::warn;

use crate::cli::{Cli, Commands};
use crate::output;
use crate::session;

pub async fn handle(cli: Cli) -> Result<()> {
    let (client, jar) = session::open_client(cli.api_base.as_deref())?;

    let result = match cli.command {
        Commands::Login(args) => auth::login(&client, args).await,
        Commands::Register(args) => auth::register(&client, args).await,
        Commands::Logout => auth::logout(&client).await,
        Commands::Whoami => auth::whoami(&client).await,
        Commands::Refresh => auth::refresh(&client).await,
        Commands::Pets(cmd) => pets::handle(&client, cmd).await,
        Commands::Profile(cmd) => profile::handle(&client, cmd).await,
        Commands::Upload(args) => upload::run(&client, args).await,
    };

    // Cookies may have been issued or rotated even if the command failed.
    if let Err(e) = jar.save() {
        warn!(error = %e, "Failed to save cookie jar");
    }

    result
}

/// Check the session before running a protected command.
pub(crate) async fn require_session(client: &ApiClient) -> Result<()> {
    let gate = SessionGate::new(client.clone());
    match gate.outcome().await {
        IdentityCheck::Confirmed => Ok(()),
        outcome if outcome.is_session_ended() => session_ended(client),
        IdentityCheck::Rejected { status } => {
            bail!("Session check failed with status {}", status)
        }
        IdentityCheck::Unreachable { message } => {
            bail!("Backend unreachable: {}", message)
        }
    }
}

/// Forget the cached token once the backend will no longer accept it.
pub(crate) fn session_ended<T>(client: &ApiClient) -> Result<T> {
    client.credentials().clear();
    output::error("Session ended");
    bail!("No active session. Run 'petnest login' first.")
}

/// Parse a `--json` argument: inline JSON, or `@path` to read it from a file.
pub(crate) fn parse_json_arg(raw: &str) -> Result<Value> {
    let text = match raw.strip_prefix('@') {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
        }
        None => raw.to_string(),
    };
    serde_json::from_str(&text).context("Invalid JSON payload")
}

/// Send a request and print the response body.
///
/// JSON bodies are pretty-printed, anything else is printed as is, and an
/// empty body prints `done`.
pub(crate) async fn send_and_print(
    client: &ApiClient,
    request: OutboundRequest,
    done: &str,
) -> Result<()> {
    let text = client
        .send_checked(request)
        .await
        .context("Request failed")?
        .text()
        .await
        .context("Failed to read response body")?;

    if text.trim().is_empty() {
        output::success(done);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(value) => output::json_pretty(&value),
        Err(_) => {
            println!("{}", text);
            Ok(())
        }
    }
}
