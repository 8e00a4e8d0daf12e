mod app;
mod config;
mod db;
mod games;
mod oauth;
mod pages;
mod state;
mod users;

#[cfg(test)]
mod test_support;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "lichess_signup=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;
    let addr = app_state.config.listen_addr;
    tracing::info!(
        lichess_host = %app_state.config.lichess.host,
        redirect_uri = %app_state.lichess.redirect_uri(),
        "starting lichess signup"
    );

    app::serve(app::build_app(app_state), addr).await
}
