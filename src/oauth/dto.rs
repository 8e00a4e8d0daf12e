use std::fmt;

use serde::Deserialize;

/// Query string of the provider's redirect back to `/authorize`.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
}

/// Fields of `/api/account` this service cares about; both may be absent.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AccountIdentity {
    pub username: Option<String>,
    pub url: Option<String>,
}

/// Opaque bearer credential. Its `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Where to send the browser and the cookie to set on the way out.
#[derive(Debug, Clone)]
pub struct RedirectInstruction {
    pub location: String,
    pub set_cookie: String,
}
