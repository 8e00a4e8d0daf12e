use axum::{
    extract::{rejection::QueryRejection, FromRef, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::{
    oauth::{
        dto::CallbackParams,
        error::{HandshakeError, ResolveError},
        handshake::{begin_authorization, complete_authorization},
        session::{cookie_value, SessionKeys, COOKIE_NAME},
    },
    pages::{self, Outcome},
    state::AppState,
    users::{error::RegistrationError, repo_types::User, services::register_user},
};

pub const SUCCESS_TITLE: &str =
    "Registration Completed, please check your lichess app for scheduled games";
pub const ERROR_TITLE: &str = "Registration Error";
const CONTACT_OPS: &str = "Please contact ops";

pub fn oauth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(login))
        .route("/register", get(login))
        .route("/authorize", get(authorize))
}

/// Redirect the browser to the lichess consent screen.
#[instrument(skip(state))]
pub async fn login(State(state): State<AppState>) -> Result<Response, (StatusCode, String)> {
    let keys = SessionKeys::from_ref(&state);
    let instruction = begin_authorization(&state.lichess, &keys).map_err(|e| {
        error!(error = %e, "could not start authorization");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Could not start authorization".to_string(),
        )
    })?;

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, instruction.location),
            (header::SET_COOKIE, instruction.set_cookie),
        ],
    )
        .into_response())
}

#[derive(Debug, Error)]
enum CallbackError {
    #[error(transparent)]
    Handshake(#[from] HandshakeError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

impl CallbackError {
    fn user_message(&self) -> &'static str {
        match self {
            Self::Handshake(HandshakeError::InvalidState) => {
                "Your login session expired or did not match, please register again."
            }
            Self::Handshake(HandshakeError::AuthorizationDenied(_)) => {
                "Access was not granted on lichess."
            }
            Self::Handshake(HandshakeError::MissingCode) => {
                "Lichess did not return an authorization code, please register again."
            }
            Self::Registration(RegistrationError::MissingFields) => {
                "Your lichess account did not report a username and profile url."
            }
            Self::Registration(RegistrationError::DuplicateUsername) => {
                "This lichess username is already registered."
            }
            Self::Registration(RegistrationError::DuplicateUrl) => {
                "This lichess profile is already registered."
            }
            Self::Registration(RegistrationError::DuplicateToken) => {
                "This lichess authorization is already registered."
            }
            Self::Handshake(HandshakeError::ProviderRejected(_))
            | Self::Handshake(HandshakeError::MalformedResponse(_))
            | Self::Resolve(_)
            | Self::Registration(RegistrationError::Store(_)) => CONTACT_OPS,
        }
    }
}

async fn finish_registration(
    state: &AppState,
    keys: &SessionKeys,
    params: &CallbackParams,
    session_cookie: Option<&str>,
) -> Result<User, CallbackError> {
    let token = complete_authorization(&state.lichess, keys, params, session_cookie).await?;
    let account = state.lichess.resolve_identity(&token).await?;
    let user = register_user(
        state.users.as_ref(),
        account.username.as_deref(),
        account.url.as_deref(),
        token.secret(),
    )
    .await?;
    Ok(user)
}

/// OAuth callback. Every outcome renders a page with status 200 and clears
/// the handshake cookie.
#[instrument(skip_all)]
pub async fn authorize(
    State(state): State<AppState>,
    query: Result<Query<CallbackParams>, QueryRejection>,
    headers: HeaderMap,
) -> Response {
    let keys = SessionKeys::from_ref(&state);
    let session_cookie = cookie_value(&headers, COOKIE_NAME);

    let result = match query {
        Ok(Query(params)) => {
            finish_registration(&state, &keys, &params, session_cookie.as_deref()).await
        }
        Err(rejection) => {
            warn!(error = %rejection, "callback query could not be read");
            Err(HandshakeError::InvalidState.into())
        }
    };

    let outcome = match result {
        Ok(user) => {
            info!(username = %user.username, "registration completed");
            Outcome::new(SUCCESS_TITLE, format!("{}, {}", user.username, user.url))
        }
        Err(e) => {
            match &e {
                CallbackError::Registration(RegistrationError::Store(_))
                | CallbackError::Handshake(HandshakeError::ProviderRejected(_))
                | CallbackError::Handshake(HandshakeError::MalformedResponse(_))
                | CallbackError::Resolve(_) => error!(error = %e, "registration failed"),
                _ => warn!(error = %e, "registration refused"),
            }
            Outcome::new(ERROR_TITLE, e.user_message())
        }
    };

    (
        [(header::SET_COOKIE, keys.clear_cookie())],
        pages::render_outcome(&outcome),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_app;
    use crate::test_support::InMemoryUserStore;
    use crate::users::repo::UserStore;
    use axum::{body::Body, http::Request};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tower::ServiceExt;
    use url::Url;
    use wiremock::matchers::{header as header_matcher, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Handshake {
        state: String,
        cookie: String,
    }

    async fn start_handshake(app: Router) -> (Handshake, Url) {
        let response = app
            .oneshot(Request::get("/register").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);

        let location = response.headers()[header::LOCATION].to_str().unwrap();
        let url = Url::parse(location).unwrap();
        let query: HashMap<_, _> = url.query_pairs().into_owned().collect();
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        let cookie = set_cookie.split(';').next().unwrap().to_string();

        (
            Handshake {
                state: query["state"].clone(),
                cookie,
            },
            url,
        )
    }

    async fn callback(app: Router, uri: &str, cookie: Option<&str>) -> (StatusCode, String, String) {
        let mut request = Request::get(uri);
        if let Some(c) = cookie {
            request = request.header(header::COOKIE, c);
        }
        let response = app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let cleared = response.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap(), cleared)
    }

    async fn mock_provider(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer",
                "access_token": "lio_alice"
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/account"))
            .and(header_matcher("Authorization", "Bearer lio_alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "username": "alice",
                "url": "https://provider/@/alice"
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn root_and_register_redirect_to_provider() {
        let app = build_app(AppState::fake("https://lichess.org"));
        for uri in ["/", "/register"] {
            let response = app
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FOUND);
            let location = response.headers()[header::LOCATION].to_str().unwrap();
            assert!(location.starts_with("https://lichess.org/oauth?"));
            assert!(location.contains("code_challenge_method=S256"));
            assert!(location.contains("scope=challenge%3Awrite"));
            let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
            assert!(cookie.starts_with("lichess_oauth="));
        }
    }

    #[tokio::test]
    async fn full_flow_registers_once_then_reports_duplicate() {
        let server = MockServer::start().await;
        mock_provider(&server).await;

        let users = Arc::new(InMemoryUserStore::default());
        let app = build_app(AppState::fake_with(&server.uri(), users.clone(), Vec::new()));

        let (handshake, url) = start_handshake(app.clone()).await;
        assert_eq!(
            url.query_pairs()
                .find(|(k, _)| k == "code_challenge_method")
                .map(|(_, v)| v.into_owned()),
            Some("S256".to_string())
        );

        let uri = format!("/authorize?code=auth-code&state={}", handshake.state);
        let (status, body, cleared) = callback(app.clone(), &uri, Some(handshake.cookie.as_str())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Registration Completed"));
        assert!(body.contains("alice, https://provider/@/alice"));
        assert!(cleared.contains("Max-Age=0"));

        let stored = users.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(stored.url, "https://provider/@/alice");
        assert_eq!(stored.token, "lio_alice");

        let (second, _) = start_handshake(app.clone()).await;
        let uri = format!("/authorize?code=auth-code&state={}", second.state);
        let (status, body, _) = callback(app, &uri, Some(second.cookie.as_str())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(ERROR_TITLE));
        assert!(body.contains("already registered"));
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn forged_state_renders_error_without_token_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let users = Arc::new(InMemoryUserStore::default());
        let app = build_app(AppState::fake_with(&server.uri(), users.clone(), Vec::new()));
        let (handshake, _) = start_handshake(app.clone()).await;

        let (status, body, _) =
            callback(app, "/authorize?code=c&state=forged", Some(handshake.cookie.as_str())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(ERROR_TITLE));
        assert!(body.contains("session expired"));
        assert_eq!(users.len(), 0);
    }

    #[tokio::test]
    async fn callback_without_cookie_is_rejected() {
        let app = build_app(AppState::fake("http://127.0.0.1:9"));
        let (status, body, _) = callback(app, "/authorize?code=c&state=s", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(ERROR_TITLE));
    }

    #[tokio::test]
    async fn repeated_query_key_still_renders_page_and_clears_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = build_app(AppState::fake(&server.uri()));
        let (handshake, _) = start_handshake(app.clone()).await;
        let uri = format!("/authorize?code=c&state={}&state=b", handshake.state);

        let (status, body, cleared) = callback(app, &uri, Some(handshake.cookie.as_str())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(ERROR_TITLE));
        assert!(body.contains("session expired"));
        assert!(cleared.starts_with("lichess_oauth="));
        assert!(cleared.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn upstream_account_failure_asks_to_contact_ops() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "lio_x"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/account"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let users = Arc::new(InMemoryUserStore::default());
        let app = build_app(AppState::fake_with(&server.uri(), users.clone(), Vec::new()));
        let (handshake, _) = start_handshake(app.clone()).await;
        let uri = format!("/authorize?code=c&state={}", handshake.state);

        let (status, body, _) = callback(app, &uri, Some(handshake.cookie.as_str())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(CONTACT_OPS));
        assert_eq!(users.len(), 0);
    }

    #[tokio::test]
    async fn account_without_url_is_not_registered() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "lio_y"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/account"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "username": "bob"
            })))
            .mount(&server)
            .await;

        let users = Arc::new(InMemoryUserStore::default());
        let app = build_app(AppState::fake_with(&server.uri(), users.clone(), Vec::new()));
        let (handshake, _) = start_handshake(app.clone()).await;
        let uri = format!("/authorize?code=c&state={}", handshake.state);

        let (_, body, _) = callback(app, &uri, Some(handshake.cookie.as_str())).await;
        assert!(body.contains("did not report a username and profile url"));
        assert_eq!(users.len(), 0);
    }
}
