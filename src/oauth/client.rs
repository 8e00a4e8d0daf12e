//! HTTP client for the lichess OAuth and account endpoints.

use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::LichessConfig;
use crate::oauth::{
    dto::{AccessToken, AccountIdentity, TokenResponse},
    error::{HandshakeError, ResolveError},
    pkce::{PkcePair, CHALLENGE_METHOD},
};

/// Lets the app create challenges on the user's behalf.
pub const SCOPE: &str = "challenge:write";

#[derive(Clone)]
pub struct LichessClient {
    http: Client,
    config: LichessConfig,
    redirect_uri: String,
}

impl LichessClient {
    pub fn new(config: LichessConfig, redirect_uri: String) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            config,
            redirect_uri,
        })
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn authorization_url(&self, state: &str, pkce: &PkcePair) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.config.authorize_url())?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", SCOPE)
            .append_pair("code_challenge", &pkce.code_challenge)
            .append_pair("code_challenge_method", CHALLENGE_METHOD)
            .append_pair("state", state);
        Ok(url)
    }

    /// Trade an authorization code and its PKCE verifier for an access token.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AccessToken, HandshakeError> {
        let response = self
            .http
            .post(self.config.token_url())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("code_verifier", code_verifier),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("client_id", self.config.client_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "token endpoint request failed");
                HandshakeError::ProviderRejected(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "token exchange rejected");
            return Err(HandshakeError::ProviderRejected(format!("status {}", status.as_u16())));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| HandshakeError::MalformedResponse(e.to_string()))?;

        match body.access_token.filter(|t| !t.is_empty()) {
            Some(token) => {
                info!("exchanged authorization code for access token");
                Ok(AccessToken::new(token))
            }
            None => Err(HandshakeError::MalformedResponse(
                "access_token missing from response".into(),
            )),
        }
    }

    /// Look up the account that owns `token`.
    pub async fn resolve_identity(&self, token: &AccessToken) -> Result<AccountIdentity, ResolveError> {
        let response = self
            .http
            .get(self.config.account_url())
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "account endpoint request failed");
                ResolveError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%status, "account lookup rejected");
            return Err(ResolveError::UpstreamRejected(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ResolveError::Unreachable(e.to_string()))?;
        let account = parse_account(&body)?;
        debug!(username = ?account.username, "account resolved");
        Ok(account)
    }
}

/// The account body must be a JSON object; its fields are then read through
/// the optional schema so absent ones stay `None`.
fn parse_account(body: &[u8]) -> Result<AccountIdentity, ResolveError> {
    let object: Map<String, Value> =
        serde_json::from_slice(body).map_err(|e| ResolveError::MalformedBody(e.to_string()))?;
    serde_json::from_value(Value::Object(object))
        .map_err(|e| ResolveError::MalformedBody(e.to_string()))
}
