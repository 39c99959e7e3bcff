//! Error types for the petnest client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, protocol, and input validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for petnest operations.
///
/// This error type covers all possible failure modes in the library,
/// with explicit variants to allow callers to handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (invalid credentials, ended session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Non-success responses from the backend.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (base URL, environment, header values).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true if the caller must log in again to continue.
    pub fn is_session_ended(&self) -> bool {
        match self {
            Error::Auth(AuthError::SessionExpired | AuthError::RefreshFailed(_)) => true,
            Error::Protocol(err) => err.is_auth_error(),
            _ => false,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {message}")]
    Builder { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else if err.is_builder() {
            TransportError::Builder {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The login exchange rejected the supplied credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The backend still answered 401 after the refresh-and-retry cycle.
    #[error("session expired")]
    SessionExpired,

    /// The refresh exchange did not produce a new access token.
    #[error("refresh failed: {0}")]
    RefreshFailed(#[from] RefreshFailure),
}

/// Why a refresh exchange failed.
///
/// Cloneable so a single outcome can be handed to every request waiting on
/// the same exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshFailure {
    /// The backend answered with a non-success status.
    #[error("refresh rejected with HTTP {status}")]
    Rejected { status: u16 },

    /// No response arrived.
    #[error("refresh transport failure: {message}")]
    Transport { message: String },

    /// The response could not be read as a token payload.
    #[error("malformed refresh response: {reason}")]
    Malformed { reason: String },
}

/// A non-success response from the backend.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Error message from the server, if one could be extracted.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API base URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Missing or malformed environment variable.
    #[error("invalid environment variable {key}: {reason}")]
    Env { key: String, reason: String },

    /// A value could not be encoded as an HTTP header.
    #[error("invalid header value for {name}")]
    Header { name: String },

    /// A request body could not be serialized.
    #[error("invalid request body: {reason}")]
    Body { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_display_includes_message() {
        let err = ProtocolError::new(404, Some("pet not found".into()));
        assert_eq!(err.to_string(), "HTTP 404: pet not found");
        assert!(!err.is_auth_error());
    }

    #[test]
    fn session_ended_classification() {
        assert!(Error::Auth(AuthError::SessionExpired).is_session_ended());
        assert!(
            Error::Auth(AuthError::RefreshFailed(RefreshFailure::Rejected { status: 401 }))
                .is_session_ended()
        );
        assert!(Error::Protocol(ProtocolError::new(401, None)).is_session_ended());
        assert!(!Error::Protocol(ProtocolError::new(500, None)).is_session_ended());
        assert!(!Error::Transport(TransportError::Timeout).is_session_ended());
    }
}
