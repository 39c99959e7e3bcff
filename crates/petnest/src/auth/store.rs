//! In-memory holder of the current access token.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, warn};

use super::cache::TokenCache;
use super::tokens::AccessToken;

/// Holds the access token every authenticated request is sent with.
///
/// The store is an explicitly owned object: construct one per session, share
/// it through an `Arc`, and clear it on logout. It never touches the network.
///
/// When a [`TokenCache`] is attached, every `set` is mirrored to it after the
/// in-memory value is published, so readers never wait on file I/O. Writes to
/// the cache are serialized and a stale value never overwrites a newer one.
/// The in-memory value stays authoritative if the cache write fails.
pub struct CredentialStore {
    current: RwLock<Slot>,
    cache: Option<Arc<dyn TokenCache>>,
    /// Generation of the value last written to the cache.
    persisted: Mutex<u64>,
}

#[derive(Default)]
struct Slot {
    token: Option<AccessToken>,
    /// Bumped on every `set`, including one that stores the same token.
    generation: u64,
}

impl CredentialStore {
    /// Create an empty, memory-only store.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Slot::default()),
            cache: None,
            persisted: Mutex::new(0),
        }
    }

    /// Create a store backed by `cache`, seeded with whatever it holds.
    pub fn with_cache(cache: Arc<dyn TokenCache>) -> Self {
        let initial = match cache.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to load cached access token, starting empty");
                None
            }
        };

        debug!(cached = initial.is_some(), "Credential store opened");

        Self {
            current: RwLock::new(Slot {
                token: initial,
                generation: 0,
            }),
            cache: Some(cache),
            persisted: Mutex::new(0),
        }
    }

    /// Returns the current access token, if any.
    pub fn get(&self) -> Option<AccessToken> {
        self.snapshot().0
    }

    /// Returns the current token together with its generation.
    pub(crate) fn snapshot(&self) -> (Option<AccessToken>, u64) {
        let slot = self.current.read().unwrap_or_else(PoisonError::into_inner);
        (slot.token.clone(), slot.generation)
    }

    /// Replace the current token, or clear it with `None`.
    pub fn set(&self, token: Option<AccessToken>) {
        let generation = {
            let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
            slot.token = token.clone();
            slot.generation += 1;
            slot.generation
        };

        let Some(cache) = &self.cache else {
            return;
        };

        let mut persisted = self.persisted.lock().unwrap_or_else(PoisonError::into_inner);
        if *persisted > generation {
            return;
        }
        if let Err(e) = cache.save(token.as_ref()) {
            warn!(error = %e, "Failed to persist access token");
        }
        *persisted = generation;
    }

    /// Clear the current token.
    pub fn clear(&self) {
        self.set(None);
    }

    /// Returns true if a token is held.
    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .is_some()
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("authenticated", &self.is_authenticated())
            .field("cached", &self.cache.is_some())
            .finish()
    }
}
