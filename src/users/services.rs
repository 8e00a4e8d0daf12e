use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::users::{
    error::RegistrationError,
    repo::UserStore,
    repo_types::{NewUser, User},
};

fn present(field: Option<&str>) -> Option<&str> {
    field.filter(|v| !v.trim().is_empty())
}

/// Persist a freshly authorized lichess account exactly once.
///
/// The lookups are a fast path that keeps the common duplicate case away from
/// the insert. Correctness under concurrent registrations comes from the
/// store's unique constraints, whose violations map to the same errors.
pub async fn register_user(
    store: &dyn UserStore,
    username: Option<&str>,
    url: Option<&str>,
    token: &str,
) -> Result<User, RegistrationError> {
    let (Some(username), Some(url)) = (present(username), present(url)) else {
        warn!("registration rejected: missing username or url");
        return Err(RegistrationError::MissingFields);
    };

    if store.find_by_username(username).await?.is_some() {
        warn!(%username, "registration rejected: username taken");
        return Err(RegistrationError::DuplicateUsername);
    }

    if store.find_by_url(url).await?.is_some() {
        warn!(%username, %url, "registration rejected: url taken");
        return Err(RegistrationError::DuplicateUrl);
    }

    let user = store
        .insert(NewUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            url: url.to_string(),
            token: token.to_string(),
            created_at: OffsetDateTime::now_utc(),
        })
        .await
        .map_err(|e| {
            debug!(error = %e, %username, "insert rejected by store");
            RegistrationError::from(e)
        })?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}
