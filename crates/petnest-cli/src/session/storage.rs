//! Location of the cached access token and refresh cookie.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use petnest::{CredentialStore, FileCookieJar, FileTokenCache};
use tracing::debug;

/// Get the data directory, creating it if needed.
fn data_dir() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "petnest").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.to_path_buf())
}

fn credentials_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("credentials.json"))
}

/// Open the cookie jar holding the refresh cookie.
///
/// An unreadable jar file is logged and treated as empty.
pub fn open_cookie_jar() -> Result<FileCookieJar> {
    Ok(FileCookieJar::open(data_dir()?.join("cookies.json")))
}

/// Open a credential store seeded from the cache file.
///
/// An unreadable cache file is logged by the store and treated as empty.
pub fn open_store() -> Result<CredentialStore> {
    let path = credentials_path()?;
    debug!(path = %path.display(), "Using credential cache");
    let cache = FileTokenCache::new(path);
    Ok(CredentialStore::with_cache(Arc::new(cache)))
}
