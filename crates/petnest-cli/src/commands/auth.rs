//! Login, registration, logout, and session inspection.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use petnest::http::endpoints::ME;
use petnest::{ApiClient, Credentials, OutboundRequest};
use serde_json::Value;

use super::{parse_json_arg, session_ended};
use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Phone number registered with the account
    #[arg(long)]
    pub phone_number: String,

    /// Account password
    #[arg(long, env = "PETNEST_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Account details as JSON, or @path to a JSON file
    #[arg(long)]
    pub json: String,
}

pub async fn login(client: &ApiClient, args: LoginArgs) -> Result<()> {
    let credentials = Credentials::new(args.phone_number, args.password);

    eprintln!("{}", "Logging in...".dimmed());

    let response = client.login(&credentials).await.context("Failed to login")?;

    output::success("Logged in successfully");
    if !response.extra.is_empty() {
        println!();
        output::json_pretty(&response.extra)?;
    }

    Ok(())
}

pub async fn register(client: &ApiClient, args: RegisterArgs) -> Result<()> {
    let payload = parse_json_arg(&args.json)?;

    let account = client
        .register(&payload)
        .await
        .context("Failed to register")?;

    output::success("Account created");
    output::json_pretty(&account)
}

pub async fn logout(client: &ApiClient) -> Result<()> {
    client.logout().await.context("Failed to reach backend")?;
    output::success("Logged out");
    Ok(())
}

pub async fn whoami(client: &ApiClient) -> Result<()> {
    let me: Value = match client.send_json(OutboundRequest::get(ME)).await {
        Ok(me) => me,
        Err(e) if e.is_session_ended() => return session_ended(client),
        Err(e) => return Err(anyhow::Error::new(e).context("Failed to fetch identity")),
    };

    output::field("API", client.api_base().as_str());
    output::json_pretty(&me)
}

pub async fn refresh(client: &ApiClient) -> Result<()> {
    eprintln!("{}", "Refreshing session...".dimmed());

    client
        .refresh_session()
        .await
        .context("Failed to refresh session. Run 'petnest login' to start a new one")?;

    output::success("Session refreshed successfully");
    Ok(())
}
