use thiserror::Error;

/// Failures of the redirect/callback handshake.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("state parameter does not match the issued session")]
    InvalidState,
    #[error("authorization denied by provider: {0}")]
    AuthorizationDenied(String),
    #[error("missing authorization code")]
    MissingCode,
    #[error("token endpoint rejected the exchange: {0}")]
    ProviderRejected(String),
    #[error("malformed token response: {0}")]
    MalformedResponse(String),
}

/// Failures of the account lookup.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("account endpoint returned status {0}")]
    UpstreamRejected(u16),
    #[error("account endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("malformed account response: {0}")]
    MalformedBody(String),
}
