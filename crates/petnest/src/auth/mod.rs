//! Authentication types and credential lifecycle.
//!
//! This module holds the access token, the store it lives in, the cookie
//! jar carrying the refresh credential, and the coordinator that renews the
//! token from it.

mod cache;
mod cookies;
mod credentials;
mod refresh;
mod session;
mod store;
mod tokens;

pub use cache::{FileTokenCache, TokenCache};
pub use cookies::FileCookieJar;
pub use credentials::Credentials;
pub use refresh::RefreshCoordinator;
pub use store::CredentialStore;
pub use tokens::AccessToken;
