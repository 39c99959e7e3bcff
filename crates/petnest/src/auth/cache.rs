//! Durable caches for the access token.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::tokens::AccessToken;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Durable storage backing a [`CredentialStore`](super::CredentialStore).
///
/// Implementations must replace the stored value atomically: a concurrent
/// `load` sees either the previous token or the new one.
pub trait TokenCache: Send + Sync {
    /// Read the cached token, if any.
    fn load(&self) -> io::Result<Option<AccessToken>>;

    /// Persist `token`, or evict the cached value when `None`.
    fn save(&self, token: Option<&AccessToken>) -> io::Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    access_token: String,
}

/// A JSON file holding the access token, readable only by the owner.
#[derive(Debug, Clone)]
pub struct FileTokenCache {
    path: PathBuf,
}

impl FileTokenCache {
    /// Create a cache backed by the file at `path`.
    ///
    /// The file and its parent directory are created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replace the file at `path` with `contents`, readable only by the owner.
///
/// Writes beside the target and renames over it so readers never see a
/// partial file.
pub(super) fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let staging = staging_path(path);
    fs::write(&staging, contents)?;

    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&staging)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&staging, perms)?;
    }

    fs::rename(&staging, path)
}

impl TokenCache for FileTokenCache {
    fn load(&self) -> io::Result<Option<AccessToken>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let stored: StoredCredential = serde_json::from_str(&json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        Ok(Some(AccessToken::new(stored.access_token)))
    }

    fn save(&self, token: Option<&AccessToken>) -> io::Result<()> {
        let Some(token) = token else {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            };
        };

        let stored = StoredCredential {
            access_token: token.as_str().to_string(),
        };
        let json = serde_json::to_string_pretty(&stored)?;
        write_private(&self.path, json.as_bytes())
    }
}
