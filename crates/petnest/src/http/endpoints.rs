//! Backend endpoint paths and wire types.

use serde::{Deserialize, Serialize};

// ============================================================================
// Endpoint Paths
// ============================================================================

/// Login exchange: credentials in, access token and refresh cookie out.
pub const LOGIN: &str = "/auth/login";

/// Account creation.
pub const REGISTER: &str = "/auth/register";

/// Refresh exchange: refresh cookie in, access token out.
pub const REFRESH: &str = "/auth/refresh";

/// Logout exchange: invalidates the refresh cookie.
pub const LOGOUT: &str = "/auth/logout";

/// Identity check.
pub const ME: &str = "/me";

/// Media upload (multipart).
pub const UPLOADS: &str = "/uploads";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for the login exchange.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub phone_number: &'a str,
    pub password: &'a str,
}

/// Response from the login exchange.
///
/// Fields other than the token are backend-defined and kept verbatim.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub(crate) access_token: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Error body shape used by the backend, when it sends JSON at all.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_request_uses_snake_case() {
        let body = serde_json::to_value(LoginRequest {
            phone_number: "+15550100",
            password: "pw",
        })
        .unwrap();
        assert_eq!(body, json!({"phone_number": "+15550100", "password": "pw"}));
    }

    #[test]
    fn login_response_keeps_extra_fields() {
        let response: LoginResponse = serde_json::from_value(json!({
            "accessToken": "tok",
            "user": {"id": 7}
        }))
        .unwrap();
        assert_eq!(response.access_token, "tok");
        assert_eq!(response.extra["user"]["id"], 7);
        assert!(!response.extra.contains_key("accessToken"));
    }
}
