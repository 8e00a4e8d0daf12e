use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::users::repo::StoreError;

/// Game between two lichess players.
#[derive(Debug, Clone, FromRow)]
pub struct Game {
    pub id: String,    // lichess game id
    pub white: String, // white player id
    pub black: String, // black player id
}

#[async_trait]
pub trait GameStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Game>, StoreError>;
}

#[derive(Clone)]
pub struct PgGameStore {
    db: PgPool,
}

impl PgGameStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GameStore for PgGameStore {
    async fn list(&self) -> Result<Vec<Game>, StoreError> {
        let rows = sqlx::query_as::<_, Game>(
            r#"
            SELECT id, white, black
            FROM games
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
