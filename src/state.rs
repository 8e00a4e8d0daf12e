use crate::config::AppConfig;
use crate::db;
use crate::games::repo::{GameStore, PgGameStore};
use crate::oauth::client::LichessClient;
use crate::users::repo::{PgUserStore, UserStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub lichess: LichessClient,
    pub users: Arc<dyn UserStore>,
    pub games: Arc<dyn GameStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let pool = db::connect(&config).await?;
        db::migrate(&pool).await?;

        let users = Arc::new(PgUserStore::new(pool.clone())) as Arc<dyn UserStore>;
        let games = Arc::new(PgGameStore::new(pool)) as Arc<dyn GameStore>;

        Self::from_parts(config, users, games)
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        games: Arc<dyn GameStore>,
    ) -> anyhow::Result<Self> {
        let lichess = LichessClient::new(config.lichess.clone(), config.redirect_uri())?;
        Ok(Self {
            config,
            lichess,
            users,
            games,
        })
    }
}
