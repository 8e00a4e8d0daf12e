use axum::{extract::State, http::StatusCode, response::Html, routing::get, Router};
use tracing::{error, instrument};

use crate::{pages, state::AppState};

pub fn game_routes() -> Router<AppState> {
    Router::new().route("/home", get(list_games))
}

#[instrument(skip(state))]
pub async fn list_games(
    State(state): State<AppState>,
) -> Result<Html<String>, (StatusCode, String)> {
    let games = state.games.list().await.map_err(|e| {
        error!(error = %e, "list games failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Could not load games".to_string())
    })?;
    Ok(pages::render_games(&games))
}
