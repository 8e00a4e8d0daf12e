use std::net::SocketAddr;

use anyhow::{bail, Context};

pub const DEFAULT_LICHESS_HOST: &str = "https://lichess.org";

#[derive(Debug, Clone)]
pub struct LichessConfig {
    pub host: String,
    pub client_id: String,
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_secs: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    /// Public base URL of this deployment, used to build the OAuth callback.
    pub base_url: String,
    pub listen_addr: SocketAddr,
    pub lichess: LichessConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let host = var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = var("APP_PORT").unwrap_or_else(|| "8080".into());
        let listen_addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .context("APP_HOST/APP_PORT do not form a socket address")?;

        let base_url = var("APP_BASE_URL").unwrap_or_else(|| format!("http://localhost:{}", port));

        let lichess = LichessConfig {
            host: var("LICHESS_HOST").unwrap_or_else(|| DEFAULT_LICHESS_HOST.into()),
            client_id: var("LICHESS_CLIENT_ID").context("LICHESS_CLIENT_ID is not set")?,
            http_timeout_secs: parse_var(&var, "HTTP_TIMEOUT_SECS").unwrap_or(10),
        };

        let secret = var("SECRET_KEY").context("SECRET_KEY is not set")?;
        if secret.trim().is_empty() {
            bail!("SECRET_KEY must not be empty");
        }
        let session = SessionConfig {
            secret,
            ttl_secs: parse_var(&var, "OAUTH_SESSION_TTL_SECS").unwrap_or(600),
        };

        Ok(Self {
            database_url,
            db_max_connections: parse_var(&var, "DB_MAX_CONNECTIONS").unwrap_or(10),
            base_url,
            listen_addr,
            lichess,
            session,
        })
    }

    pub fn redirect_uri(&self) -> String {
        format!("{}/authorize", self.base_url.trim_end_matches('/'))
    }

    /// Cookies are only marked `Secure` when the deployment is served over TLS.
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl LichessConfig {
    pub fn authorize_url(&self) -> String {
        format!("{}/oauth", self.host.trim_end_matches('/'))
    }

    pub fn token_url(&self) -> String {
        format!("{}/api/token", self.host.trim_end_matches('/'))
    }

    pub fn account_url(&self) -> String {
        format!("{}/api/account", self.host.trim_end_matches('/'))
    }
}

fn parse_var<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    var(key).and_then(|v| v.parse::<T>().ok())
}
