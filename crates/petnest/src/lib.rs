//! petnest - Authenticated client for the petnest adoption backend.
//!
//! All requests flow through an [`ApiClient`], which attaches the current
//! access token, and on 401 renews it from the refresh cookie and retries
//! once. Concurrent 401s share a single refresh exchange.
//!
//! # Example
//!
//! ```no_run
//! use petnest::{ApiClient, ClientConfig, Credentials, OutboundRequest};
//!
//! # async fn example() -> Result<(), petnest::Error> {
//! let client = ApiClient::new(ClientConfig::from_env()?)?;
//! client.login(&Credentials::new("+15550100", "password")).await?;
//!
//! let pets: serde_json::Value = client.send_json(OutboundRequest::get("/pets")).await?;
//! println!("{}", pets);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod media;
pub mod types;

// Re-export primary types at crate root for convenience
pub use auth::{
    AccessToken, CredentialStore, Credentials, FileCookieJar, FileTokenCache, TokenCache,
};
pub use config::ClientConfig;
pub use error::Error;
pub use gate::{GateState, IdentityCheck, SessionGate};
pub use http::{ApiClient, Body, Multipart, OutboundRequest};
pub use media::{MediaType, UploadResult};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
