//! Session gate for protected views.

use tokio::sync::{OnceCell, watch};
use tracing::{debug, instrument, warn};

use crate::http::endpoints::ME;
use crate::http::{ApiClient, OutboundRequest};

/// Where a gate sends callers whose session has ended.
pub const LOGIN_PATH: &str = "/login";

/// Outcome of a session check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// The identity check has not resolved yet. Show a neutral placeholder.
    Pending,
    /// The session is valid. Show the protected content.
    Authenticated,
    /// The session has ended. Redirect to [`LOGIN_PATH`].
    Unauthenticated,
}

/// What the identity check found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityCheck {
    /// The backend accepted the session.
    Confirmed,
    /// The backend answered with a non-success status after any refresh.
    Rejected { status: u16 },
    /// The backend could not be reached.
    Unreachable { message: String },
}

impl IdentityCheck {
    /// The gate state this outcome resolves to.
    pub fn state(&self) -> GateState {
        match self {
            IdentityCheck::Confirmed => GateState::Authenticated,
            _ => GateState::Unauthenticated,
        }
    }

    /// Returns true if the backend itself refused the session.
    ///
    /// An unreachable backend or a server error says nothing about the
    /// session, so only a 401 counts.
    pub fn is_session_ended(&self) -> bool {
        matches!(self, IdentityCheck::Rejected { status: 401 })
    }
}

/// Checks the session once when a protected view is activated.
///
/// One gate corresponds to one activation: the identity check runs on the
/// first [`activate`](Self::activate) call and every later or concurrent call
/// shares its outcome. The gate never polls.
#[derive(Debug)]
pub struct SessionGate {
    client: ApiClient,
    state: watch::Sender<GateState>,
    check: OnceCell<IdentityCheck>,
}

impl SessionGate {
    /// Create a gate in the [`GateState::Pending`] state.
    pub fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(GateState::Pending);
        Self {
            client,
            state,
            check: OnceCell::new(),
        }
    }

    /// Returns the current state without waiting.
    pub fn state(&self) -> GateState {
        *self.state.borrow()
    }

    /// Watch state changes, e.g. to swap a placeholder for content.
    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.state.subscribe()
    }

    /// Returns the login entry point for unauthenticated callers.
    pub fn login_path(&self) -> &'static str {
        LOGIN_PATH
    }

    /// Run the identity check once, and return the resolved state.
    pub async fn activate(&self) -> GateState {
        self.outcome().await.state()
    }

    /// Run the identity check once, and return what it found.
    ///
    /// Shares the check with [`activate`](Self::activate); use it when the
    /// reason for an `Unauthenticated` state matters.
    #[instrument(skip(self))]
    pub async fn outcome(&self) -> &IdentityCheck {
        self.check
            .get_or_init(|| async {
                let outcome = self.check_identity().await;
                self.state.send_replace(outcome.state());
                outcome
            })
            .await
    }

    async fn check_identity(&self) -> IdentityCheck {
        match self.client.send(OutboundRequest::get(ME)).await {
            Ok(response) if response.status().is_success() => {
                debug!("Session confirmed");
                IdentityCheck::Confirmed
            }
            Ok(response) => {
                debug!(status = %response.status(), "Identity check rejected");
                IdentityCheck::Rejected {
                    status: response.status().as_u16(),
                }
            }
            Err(e) => {
                warn!(error = %e, "Identity check failed");
                IdentityCheck::Unreachable {
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApiUrl, ClientConfig};

    #[test]
    fn starts_pending() {
        let api = ApiUrl::new("https://api.petnest.example").unwrap();
        let gate = SessionGate::new(ApiClient::new(ClientConfig::new(api)).unwrap());
        assert_eq!(gate.state(), GateState::Pending);
        assert_eq!(*gate.subscribe().borrow(), GateState::Pending);
        assert_eq!(gate.login_path(), "/login");
    }

    #[tokio::test]
    async fn unreachable_backend_is_unauthenticated() {
        let api = ApiUrl::new("http://127.0.0.1:9").unwrap();
        let gate = SessionGate::new(ApiClient::new(ClientConfig::new(api)).unwrap());

        assert_eq!(gate.activate().await, GateState::Unauthenticated);
        assert_eq!(gate.state(), GateState::Unauthenticated);

        let outcome = gate.outcome().await;
        assert!(matches!(outcome, IdentityCheck::Unreachable { .. }));
        assert!(!outcome.is_session_ended());
    }

    #[test]
    fn only_401_ends_the_session() {
        assert!(IdentityCheck::Rejected { status: 401 }.is_session_ended());
        assert!(!IdentityCheck::Rejected { status: 503 }.is_session_ended());
        assert!(!IdentityCheck::Confirmed.is_session_ended());
        assert_eq!(
            IdentityCheck::Rejected { status: 503 }.state(),
            GateState::Unauthenticated
        );
    }
}
