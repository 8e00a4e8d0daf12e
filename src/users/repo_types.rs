use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Registered lichess account.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,           // lichess username
    pub url: String,                // lichess profile url
    pub token: String,              // OAuth access token, never exposed
    pub created_at: OffsetDateTime, // insert time, UTC
}

/// Row about to be inserted; ids and timestamps are assigned by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub url: String,
    pub token: String,
    pub created_at: OffsetDateTime,
}

impl From<NewUser> for User {
    fn from(n: NewUser) -> Self {
        Self {
            id: n.id,
            username: n.username,
            url: n.url,
            token: n.token,
            created_at: n.created_at,
        }
    }
}
