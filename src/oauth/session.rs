//! Signed cookie carrying the PKCE verifier and `state` between the redirect
//! and the callback, so no handshake state lives in server memory.

use axum::{
    extract::FromRef,
    http::{header, HeaderMap},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::state::AppState;

pub const COOKIE_NAME: &str = "lichess_oauth";

/// Handshake material issued by the redirect step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingAuthorization {
    pub state: String,
    pub code_verifier: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    secure: bool,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        SessionKeys::new(
            &state.config.session.secret,
            state.config.session.ttl_secs,
            state.config.secure_cookies(),
        )
    }
}

impl SessionKeys {
    pub fn new(secret: &str, ttl_secs: i64, secure: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs),
            secure,
        }
    }

    pub fn sign(&self, state: &str, code_verifier: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = PendingAuthorization {
            state: state.to_string(),
            code_verifier: code_verifier.to_string(),
            iat: now.unix_timestamp().max(0) as usize,
            exp: (now + self.ttl).unix_timestamp().max(0) as usize,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!("oauth session signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<PendingAuthorization> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<PendingAuthorization>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    /// `Set-Cookie` value storing the signed session.
    pub fn cookie(&self, token: &str) -> String {
        self.cookie_with(token, self.ttl.whole_seconds())
    }

    /// `Set-Cookie` value that removes the session from the browser.
    pub fn clear_cookie(&self) -> String {
        self.cookie_with("", 0)
    }

    fn cookie_with(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{COOKIE_NAME}={value}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}"
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Value of the cookie `name` from the request's `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
        .filter(|v| !v.is_empty())
}
