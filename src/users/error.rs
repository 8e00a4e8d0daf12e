use thiserror::Error;

use crate::users::repo::{StoreError, UniqueKey};

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("username and url are both required")]
    MissingFields,
    #[error("username is already registered")]
    DuplicateUsername,
    #[error("profile url is already registered")]
    DuplicateUrl,
    #[error("access token is already registered")]
    DuplicateToken,
    #[error("user store failure: {0}")]
    Store(#[source] sqlx::Error),
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(UniqueKey::Username) => Self::DuplicateUsername,
            StoreError::UniqueViolation(UniqueKey::Url) => Self::DuplicateUrl,
            StoreError::UniqueViolation(UniqueKey::Token) => Self::DuplicateToken,
            StoreError::Database(e) => Self::Store(e),
        }
    }
}
