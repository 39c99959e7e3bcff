//! Session handling for the CLI.
//!
//! The access token and the cookie jar carrying the refresh cookie are both
//! kept on disk between invocations.

pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use petnest::config::API_BASE_ENV;
use petnest::{ApiClient, ClientConfig, FileCookieJar};

/// Build a client for `api_base`, backed by the on-disk token cache and
/// cookie jar.
///
/// Other settings such as the timeout still come from the environment. The
/// returned jar must be saved once the command is done.
pub fn open_client(api_base: Option<&str>) -> Result<(ApiClient, FileCookieJar)> {
    let api_base = api_base
        .map(str::to_string)
        .context("No backend configured. Pass --api-base or set PETNEST_API_BASE.")?;

    let config = ClientConfig::from_lookup(|key| {
        if key == API_BASE_ENV {
            Some(api_base.clone())
        } else {
            std::env::var(key).ok()
        }
    })
    .context("Invalid client configuration")?;

    let store = storage::open_store().context("Failed to open credential cache")?;
    let jar = storage::open_cookie_jar().context("Failed to open cookie jar")?;
    let client = ApiClient::with_cookie_jar(config, Arc::new(store), &jar)
        .context("Failed to build HTTP client")?;

    Ok((client, jar))
}
