use crate::state::AppState;
use axum::Router;

pub mod client;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod handshake;
pub mod pkce;
pub mod session;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::oauth_routes())
}
