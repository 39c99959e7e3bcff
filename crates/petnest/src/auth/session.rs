//! Login, registration, and logout exchanges.

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use tracing::{debug, info, instrument, warn};

use crate::error::{AuthError, Error, ProtocolError};
use crate::http::endpoints::{LOGIN, LOGOUT, LoginRequest, LoginResponse, REGISTER};
use crate::http::{ApiClient, OutboundRequest, ensure_success};

use super::credentials::Credentials;
use super::tokens::AccessToken;

fn json_content_type() -> HeaderValue {
    HeaderValue::from_static("application/json")
}

impl ApiClient {
    /// Authenticate and store the returned access token.
    ///
    /// The refresh credential arrives as a cookie and stays in the client's
    /// cookie jar.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on 401, a protocol error for
    /// any other non-success status or a success without a usable token.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, Error> {
        info!("Logging in");

        let request = OutboundRequest::post(LOGIN)
            .header(CONTENT_TYPE, json_content_type())
            .json(&LoginRequest {
                phone_number: credentials.phone_number(),
                password: credentials.password(),
            })?
            .without_auth();

        let response = self.send(request).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials.into());
        }

        let response = ensure_success(response).await?;
        let status = response.status().as_u16();
        let login: LoginResponse = response.json().await?;
        if login.access_token.is_empty() {
            return Err(ProtocolError::new(
                status,
                Some("login response carried an empty accessToken".to_string()),
            )
            .into());
        }

        self.credentials()
            .set(Some(AccessToken::new(login.access_token.clone())));

        debug!("Login succeeded");
        Ok(login)
    }

    /// Create an account. The payload is passed through to the backend as is.
    #[instrument(skip(self, payload))]
    pub async fn register(&self, payload: &serde_json::Value) -> Result<serde_json::Value, Error> {
        info!("Registering account");

        let request = OutboundRequest::post(REGISTER)
            .header(CONTENT_TYPE, json_content_type())
            .json(payload)?
            .without_auth();

        self.send_json(request).await
    }

    /// End the session.
    ///
    /// Local credentials are cleared even if the backend rejects the logout
    /// or cannot be reached; a transport failure is still reported.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), Error> {
        info!("Logging out");

        let result = self.send(OutboundRequest::post(LOGOUT)).await;
        self.credentials().clear();

        let response = result?;
        if !response.status().is_success() {
            warn!(status = %response.status(), "Logout rejected, local credentials cleared anyway");
        }

        Ok(())
    }
}
