//! Authenticated request executor.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace, warn};

use reqwest_cookie_store::CookieStoreMutex;

use crate::auth::{AccessToken, CredentialStore, FileCookieJar, RefreshCoordinator};
use crate::config::ClientConfig;
use crate::error::{AuthError, Error, InvalidInputError, ProtocolError};
use crate::types::ApiUrl;

use super::endpoints::{ErrorBody, REFRESH};
use super::request::{Body, OutboundRequest};

/// HTTP client for the petnest backend.
///
/// Attaches the current access token to every authenticated request and, when
/// the backend answers 401, refreshes the token once (sharing the exchange
/// with any other request that hit 401 at the same time) and re-sends the
/// request exactly once.
///
/// Clients are cheap to clone and safe to share across tasks. Every clone
/// shares the credential store, the refresh coordinator, and the cookie jar
/// that carries the refresh credential.
///
/// # Example
///
/// ```no_run
/// use petnest::{ApiClient, ClientConfig, OutboundRequest};
///
/// # async fn example() -> Result<(), petnest::Error> {
/// let client = ApiClient::new(ClientConfig::from_env()?)?;
/// let pets: serde_json::Value = client.send_json(OutboundRequest::get("/pets")).await?;
/// println!("{}", pets);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    api_base: ApiUrl,
    store: Arc<CredentialStore>,
    refresher: RefreshCoordinator,
}

impl ApiClient {
    /// Create a client with an empty, memory-only credential store.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        Self::with_store(config, Arc::new(CredentialStore::new()))
    }

    /// Create a client around an existing credential store.
    ///
    /// The refresh cookie is kept in memory for the life of the client.
    pub fn with_store(config: ClientConfig, store: Arc<CredentialStore>) -> Result<Self, Error> {
        Self::build(config, store, None)
    }

    /// Create a client whose refresh cookie lives in `jar`.
    ///
    /// Use this when the session must survive the process, together with a
    /// store backed by a [`TokenCache`](crate::TokenCache).
    pub fn with_cookie_jar(
        config: ClientConfig,
        store: Arc<CredentialStore>,
        jar: &FileCookieJar,
    ) -> Result<Self, Error> {
        Self::build(config, store, Some(jar.provider()))
    }

    fn build(
        config: ClientConfig,
        store: Arc<CredentialStore>,
        cookies: Option<Arc<CookieStoreMutex>>,
    ) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        builder = match cookies {
            Some(jar) => builder.cookie_provider(jar),
            None => builder.cookie_store(true),
        };
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let refresher = RefreshCoordinator::new(
            http.clone(),
            config.api_base.endpoint(REFRESH),
            store.clone(),
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                api_base: config.api_base,
                store,
                refresher,
            }),
        })
    }

    /// Returns the backend base URL.
    pub fn api_base(&self) -> &ApiUrl {
        &self.inner.api_base
    }

    /// Returns the credential store shared by every clone of this client.
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.inner.store
    }

    /// Returns the refresh coordinator.
    pub fn refresher(&self) -> &RefreshCoordinator {
        &self.inner.refresher
    }

    /// Send a request, refreshing and retrying once on 401.
    ///
    /// Returns whatever response the final dispatch produced, whatever its
    /// status. If the refresh exchange fails, the original 401 response is
    /// returned. Only transport failures and invalid input are errors.
    #[instrument(
        skip(self, request),
        fields(method = %request.method, path = %request.path, auth = request.auth)
    )]
    pub async fn send(&self, request: OutboundRequest) -> Result<reqwest::Response, Error> {
        let wave = self.inner.refresher.wave();
        let token = if request.auth {
            self.inner.store.get()
        } else {
            None
        };

        let response = self.dispatch(&request, token.as_ref()).await?;
        let status = response.status();
        trace!(%status, "Response");

        if status != StatusCode::UNAUTHORIZED || !request.auth {
            return Ok(response);
        }

        debug!(had_token = token.is_some(), "Access token rejected, refreshing");

        match self.inner.refresher.refresh_after(token.as_ref(), wave).await {
            Ok(fresh) => {
                let retried = self.dispatch(&request, Some(&fresh)).await?;
                debug!(status = %retried.status(), "Retried after refresh");
                Ok(retried)
            }
            Err(failure) => {
                warn!(%failure, "Session could not be refreshed");
                Ok(response)
            }
        }
    }

    /// Send a request and turn a non-success status into an error.
    ///
    /// A 401 that survives the refresh-and-retry cycle becomes
    /// [`AuthError::SessionExpired`].
    pub async fn send_checked(&self, request: OutboundRequest) -> Result<reqwest::Response, Error> {
        let response = self.send(request).await?;
        ensure_success(response).await
    }

    /// Send a request and decode a successful JSON response.
    pub async fn send_json<R: DeserializeOwned>(&self, request: OutboundRequest) -> Result<R, Error> {
        let response = self.send_checked(request).await?;
        Ok(response.json::<R>().await?)
    }

    /// Force a refresh exchange, joining one already in flight.
    #[instrument(skip(self))]
    pub async fn refresh_session(&self) -> Result<AccessToken, Error> {
        self.inner
            .refresher
            .refresh()
            .await
            .map_err(|failure| AuthError::RefreshFailed(failure).into())
    }

    async fn dispatch(
        &self,
        request: &OutboundRequest,
        token: Option<&AccessToken>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.inner.api_base.endpoint(&request.path);
        let mut headers = request.effective_headers();

        if let Some(token) = token {
            let mut value =
                HeaderValue::from_str(&token.bearer()).map_err(|_| InvalidInputError::Header {
                    name: AUTHORIZATION.to_string(),
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), &url)
            .headers(headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match &request.body {
            None => builder,
            Some(Body::Json(bytes) | Body::Binary(bytes)) => builder.body(bytes.clone()),
            Some(Body::Text(text)) => builder.body(text.clone()),
            Some(Body::Multipart(form)) => builder.multipart(form.to_form()?),
        };

        Ok(builder.send().await?)
    }
}

/// Pass a successful response through, or read the body into an error.
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(AuthError::SessionExpired.into());
    }

    Err(parse_error_response(response).await.into())
}

/// Extract a message from an error response body.
async fn parse_error_response(response: reqwest::Response) -> ProtocolError {
    let status = response.status().as_u16();

    let text = match response.text().await {
        Ok(text) => text,
        Err(_) => return ProtocolError::new(status, None),
    };

    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.message.or(body.error),
        Err(_) => Some(text.trim().to_string()).filter(|t| !t.is_empty()),
    };

    ProtocolError::new(status, message)
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_base", &self.inner.api_base)
            .field("credentials", &self.inner.store)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let api = ApiUrl::new("https://api.petnest.example").unwrap();
        let client = ApiClient::new(ClientConfig::new(api.clone())).unwrap();
        assert_eq!(client.api_base(), &api);
        assert!(!client.credentials().is_authenticated());
    }

    #[test]
    fn clones_share_credentials() {
        let api = ApiUrl::new("https://api.petnest.example").unwrap();
        let client = ApiClient::new(ClientConfig::new(api)).unwrap();
        let other = client.clone();

        client
            .credentials()
            .set(Some(AccessToken::new("shared")));
        assert_eq!(
            other.credentials().get(),
            Some(AccessToken::new("shared"))
        );
    }

    #[test]
    fn debug_does_not_leak_token() {
        let api = ApiUrl::new("https://api.petnest.example").unwrap();
        let client = ApiClient::new(ClientConfig::new(api)).unwrap();
        client.credentials().set(Some(AccessToken::new("hidden")));
        assert!(!format!("{:?}", client).contains("hidden"));
    }
}
