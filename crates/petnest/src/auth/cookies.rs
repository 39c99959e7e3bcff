//! Refresh cookie persistence.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};

use cookie_store::CookieStore;
use reqwest_cookie_store::CookieStoreMutex;
use tracing::{debug, warn};

use super::cache::write_private;

/// A cookie jar that outlives the process.
///
/// The jar is handed to the transport, which stores cookies from responses
/// and presents them on matching requests. This type only moves the jar to
/// and from disk, it never inspects individual cookies. Attach it with
/// [`ApiClient::with_cookie_jar`](crate::ApiClient::with_cookie_jar) and call
/// [`save`](Self::save) before exiting.
#[derive(Clone)]
pub struct FileCookieJar {
    path: PathBuf,
    jar: Arc<CookieStoreMutex>,
}

impl FileCookieJar {
    /// Open the jar stored at `path`.
    ///
    /// A missing file gives an empty jar. An unreadable one is logged and
    /// replaced by an empty jar on the next save.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let store = match load(&path) {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "Failed to load cookie jar, starting empty");
                CookieStore::default()
            }
        };

        debug!(path = %path.display(), "Cookie jar opened");

        Self {
            path,
            jar: Arc::new(CookieStoreMutex::new(store)),
        }
    }

    /// Returns the path of the jar file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the jar to its file, session cookies included.
    pub fn save(&self) -> io::Result<()> {
        let mut json = Vec::new();
        {
            let store = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
            cookie_store::serde::json::save_incl_expired_and_nonpersistent(&store, &mut json)
                .map_err(io::Error::other)?;
        }
        write_private(&self.path, &json)
    }

    pub(crate) fn provider(&self) -> Arc<CookieStoreMutex> {
        self.jar.clone()
    }
}

fn load(path: &Path) -> io::Result<CookieStore> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(CookieStore::default()),
        Err(e) => return Err(e),
    };

    cookie_store::serde::json::load(BufReader::new(file))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

impl fmt::Debug for FileCookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileCookieJar")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
