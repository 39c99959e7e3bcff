//! Phone-number login identity.

use std::fmt;

/// What a user types on the login form: the phone number the account was
/// registered with and its password.
///
/// Sent once, as the `{ phone_number, password }` body of the login
/// exchange, and never stored. After login the session is carried by the
/// access token and refresh cookie alone. `Debug` shows the phone number and
/// redacts the password.
///
/// # Example
///
/// ```
/// use petnest::Credentials;
///
/// let creds = Credentials::new("+15550100", "hunter2");
/// assert_eq!(creds.phone_number(), "+15550100");
/// ```
#[derive(Clone)]
pub struct Credentials {
    phone_number: String,
    password: String,
}

impl Credentials {
    /// Pair a phone number with its password. Neither is validated here, the
    /// backend decides whether the pair is acceptable.
    pub fn new(phone_number: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            password: password.into(),
        }
    }

    /// Returns the phone number identifying the account.
    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    /// Only read when building the login request body.
    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("phone_number", &self.phone_number)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
