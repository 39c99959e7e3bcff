//! Single-flight access token refresh.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use crate::error::RefreshFailure;

use super::store::CredentialStore;
use super::tokens::AccessToken;

type RefreshOutcome = Result<AccessToken, RefreshFailure>;

/// A refresh exchange that is currently in progress.
///
/// Every caller that observes it awaits the same cell; whichever caller
/// drives the cell performs the one exchange.
struct PendingRefresh {
    outcome: OnceCell<RefreshOutcome>,
}

/// Body of a successful refresh exchange.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Coordinator state guarded by one lock.
#[derive(Default)]
struct Slot {
    pending: Option<Arc<PendingRefresh>>,
    /// Number of exchanges that have finished, successfully or not.
    finished: u64,
    /// The last exchange, if it failed.
    failed: Option<FailedRefresh>,
}

/// A failed exchange and the credential generation it was run against.
struct FailedRefresh {
    generation: u64,
    failure: RefreshFailure,
}

/// Marks when a request was dispatched relative to refresh exchanges.
///
/// Taken before dispatch and handed back with the 401, so the coordinator can
/// tell whether an exchange already finished on that request's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Wave(u64);

/// Mints new access tokens from the ambient refresh cookie.
///
/// Concurrent callers share one exchange: while a refresh is pending, any
/// further call waits for that exchange's outcome instead of issuing its own.
/// A failed exchange is never retried here and leaves the credential store
/// untouched. Requests that were already in flight when it failed get the
/// same failure when their 401 arrives late, until the store changes or an
/// explicit [`refresh`](Self::refresh) runs.
pub struct RefreshCoordinator {
    http: reqwest::Client,
    endpoint: String,
    store: Arc<CredentialStore>,
    slot: Mutex<Slot>,
}

impl RefreshCoordinator {
    /// `http` must be the cookie-carrying client used for every other
    /// request to the backend.
    pub(crate) fn new(http: reqwest::Client, endpoint: String, store: Arc<CredentialStore>) -> Self {
        Self {
            http,
            endpoint,
            store,
            slot: Mutex::new(Slot::default()),
        }
    }

    /// Obtain a new access token, joining an in-flight exchange if there is one.
    ///
    /// A previous failure is forgotten and a new exchange starts if none is
    /// pending. On success the token has already been published to the
    /// credential store when this returns.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AccessToken, RefreshFailure> {
        let pending = {
            let mut slot = self.lock();
            slot.failed = None;
            Self::join_or_start(&mut slot)
        };

        self.resolve(pending).await
    }

    /// Returns the marker to take before dispatching a request.
    pub(crate) fn wave(&self) -> Wave {
        Wave(self.lock().finished)
    }

    /// Refresh on behalf of a request that was dispatched at `wave` carrying
    /// `rejected` and answered 401.
    ///
    /// With no exchange pending:
    /// - if the store holds a different token, the token was rotated after the
    ///   request went out; it is returned without a new exchange.
    /// - if an exchange finished since `wave` and failed against the current
    ///   credentials, that failure is returned without a new exchange.
    pub(crate) async fn refresh_after(
        &self,
        rejected: Option<&AccessToken>,
        wave: Wave,
    ) -> RefreshOutcome {
        let pending = {
            let mut slot = self.lock();
            if slot.pending.is_none() {
                let (current, generation) = self.store.snapshot();
                if let Some(current) = current
                    && Some(&current) != rejected
                {
                    debug!("Access token rotated since dispatch, reusing it");
                    return Ok(current);
                }
                if slot.finished > wave.0
                    && let Some(failed) = &slot.failed
                    && failed.generation == generation
                {
                    debug!("Refresh already failed since dispatch, not retrying");
                    return Err(failed.failure.clone());
                }
            }
            Self::join_or_start(&mut slot)
        };

        self.resolve(pending).await
    }

    /// Returns true while an exchange is pending.
    pub fn is_refreshing(&self) -> bool {
        self.lock().pending.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn join_or_start(slot: &mut Slot) -> Arc<PendingRefresh> {
        match &slot.pending {
            Some(pending) => {
                debug!("Joining in-flight refresh");
                pending.clone()
            }
            None => {
                debug!("Starting refresh");
                let pending = Arc::new(PendingRefresh {
                    outcome: OnceCell::new(),
                });
                slot.pending = Some(pending.clone());
                pending
            }
        }
    }

    async fn resolve(&self, pending: Arc<PendingRefresh>) -> RefreshOutcome {
        // If the caller driving the exchange is dropped mid-flight, the next
        // waiter takes over and runs it; still only one at a time.
        pending
            .outcome
            .get_or_init(|| self.run(&pending))
            .await
            .clone()
    }

    async fn run(&self, pending: &Arc<PendingRefresh>) -> RefreshOutcome {
        let (_, generation) = self.store.snapshot();
        let outcome = self.exchange().await;

        let failed = match &outcome {
            Ok(token) => {
                self.store.set(Some(token.clone()));
                info!("Access token refreshed");
                None
            }
            Err(failure) => {
                warn!(%failure, "Refresh exchange failed");
                Some(FailedRefresh {
                    generation,
                    failure: failure.clone(),
                })
            }
        };

        // Publish before clearing so a late 401 sees the new token rather
        // than starting another exchange.
        let mut slot = self.lock();
        if slot.pending.as_ref().is_some_and(|p| Arc::ptr_eq(p, pending)) {
            slot.pending = None;
            slot.finished += 1;
            slot.failed = failed;
        }

        outcome
    }

    async fn exchange(&self) -> RefreshOutcome {
        // No Authorization header and no body: the cookie jar presents the
        // refresh credential.
        let response = self
            .http
            .post(&self.endpoint)
            .send()
            .await
            .map_err(|e| RefreshFailure::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshFailure::Rejected {
                status: status.as_u16(),
            });
        }

        let body: RefreshResponse =
            response
                .json()
                .await
                .map_err(|e| RefreshFailure::Malformed {
                    reason: e.to_string(),
                })?;

        match body.access_token {
            Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
            _ => Err(RefreshFailure::Malformed {
                reason: "missing accessToken".to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("endpoint", &self.endpoint)
            .field("refreshing", &self.is_refreshing())
            .finish()
    }
}
