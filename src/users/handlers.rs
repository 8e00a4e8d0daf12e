use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use tracing::{error, instrument};

use crate::{pages, state::AppState};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Html<String>, (StatusCode, String)> {
    let users = state.users.list().await.map_err(|e| {
        error!(error = %e, "list users failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Could not load users".to_string())
    })?;
    Ok(pages::render_users(&users))
}
