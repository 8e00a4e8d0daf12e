use tracing::{debug, warn};

use crate::oauth::{
    client::LichessClient,
    dto::{AccessToken, CallbackParams, RedirectInstruction},
    error::HandshakeError,
    pkce::{random_token, PkcePair},
    session::SessionKeys,
};

/// Fresh PKCE pair and `state`, the provider URL carrying them, and the
/// signed cookie that remembers them until the callback.
pub fn begin_authorization(
    client: &LichessClient,
    keys: &SessionKeys,
) -> anyhow::Result<RedirectInstruction> {
    let pkce = PkcePair::generate();
    let state = random_token(32);

    let location = client.authorization_url(&state, &pkce)?.to_string();
    let session = keys.sign(&state, &pkce.code_verifier)?;

    debug!("authorization redirect issued");
    Ok(RedirectInstruction {
        location,
        set_cookie: keys.cookie(&session),
    })
}

/// Check the callback against the session cookie, then exchange the code.
pub async fn complete_authorization(
    client: &LichessClient,
    keys: &SessionKeys,
    params: &CallbackParams,
    session_cookie: Option<&str>,
) -> Result<AccessToken, HandshakeError> {
    if let Some(error) = &params.error {
        let description = params.error_description.as_deref().unwrap_or("no description");
        warn!(%error, "provider returned an authorization error");
        return Err(HandshakeError::AuthorizationDenied(format!("{}: {}", error, description)));
    }

    let pending = session_cookie
        .and_then(|token| match keys.verify(token) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(error = %e, "oauth session cookie rejected");
                None
            }
        })
        .ok_or(HandshakeError::InvalidState)?;

    if params.state.as_deref() != Some(pending.state.as_str()) {
        warn!("callback state does not match session");
        return Err(HandshakeError::InvalidState);
    }

    let code = params
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or(HandshakeError::MissingCode)?;

    client.exchange_code(code, &pending.code_verifier).await
}
