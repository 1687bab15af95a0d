//! Tenant Portal Admin Web Layer
//!
//! Email/password login for administrators, server-side sessions that carry
//! only the admin id, and the database plumbing behind them.

pub mod auth;
#[cfg(feature = "postgres")]
pub mod db;
pub mod handlers;
#[cfg(feature = "postgres")]
pub mod migrations;
pub mod routes;
pub mod server;
pub mod sessions;
pub mod state;

// Re-export main types
pub use server::PortalServer;
pub use state::AppState;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Router,
};
use portal_core::{CoreError, DatabaseConfig, Environment, LogFormat, LoggingConfig};
use std::str::FromStr;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true)
        .allow_headers([ACCEPT, CONTENT_TYPE]);

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Ten years; longer lifetimes are clamped
const MAX_SESSION_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Where admins and sessions are stored
#[derive(Debug, Clone, Default)]
pub enum DatabaseSource {
    /// In-memory stores, lost on restart
    #[default]
    Memory,
    /// Explicit connection URL
    Url(String),
    /// Connection profile assembled from `DB_*` variables
    Profile(DatabaseConfig),
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable development mode
    pub dev_mode: bool,
    /// Session lifetime in seconds
    pub session_ttl_secs: u64,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
    /// Upper bound on a single admin lookup, in milliseconds
    pub lookup_timeout_ms: u64,
    /// Origins allowed to call the API with credentials
    pub cors_origins: Vec<String>,
    /// Backing store selection
    pub database: DatabaseSource,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
            session_ttl_secs: 24 * 60 * 60,
            cookie_secure: false,
            lookup_timeout_ms: 5_000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            database: DatabaseSource::Memory,
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> WebResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key).filter(|value| !value.is_empty()) {
        Some(raw) => raw
            .parse()
            .map_err(|_| WebError::Config(format!("Invalid value for {}: {}", key, raw))),
        None => Ok(default),
    }
}

/// Split a comma-separated origin list
///
/// Credentialed CORS needs explicit origins, so `*` is rejected along with
/// anything that is not a valid header value.
fn parse_cors_origins(raw: &str) -> WebResult<Vec<String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            if origin == "*" {
                return Err(WebError::Config(
                    "PORTAL_CORS_ORIGINS cannot contain `*` when credentials are allowed"
                        .to_string(),
                ));
            }
            origin
                .parse::<HeaderValue>()
                .map(|_| origin.to_string())
                .map_err(|_| WebError::Config(format!("Invalid CORS origin: {}", origin)))
        })
        .collect()
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> WebResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// `DATABASE_URL` wins; otherwise `DB_HOST` or a production environment
    /// (`APP_ENV`, then `NODE_ENV`) select the `DB_*` profile; otherwise the
    /// in-memory stores are used.
    pub fn from_lookup<F>(lookup: F) -> WebResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database = if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            DatabaseSource::Url(url)
        } else if lookup("DB_HOST").is_some_and(|v| !v.is_empty())
            || Environment::from_lookup(&lookup) == Environment::Production
        {
            DatabaseSource::Profile(DatabaseConfig::from_lookup(&lookup)?)
        } else {
            DatabaseSource::Memory
        };

        let cors_origins = match lookup("PORTAL_CORS_ORIGINS") {
            Some(raw) => parse_cors_origins(&raw)?,
            None => defaults.cors_origins,
        };

        Ok(Self {
            host: lookup("PORTAL_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORTAL_PORT", defaults.port)?,
            dev_mode: parse_var(&lookup, "PORTAL_DEV_MODE", defaults.dev_mode)?,
            session_ttl_secs: parse_var(
                &lookup,
                "PORTAL_SESSION_TTL_SECS",
                defaults.session_ttl_secs,
            )?,
            cookie_secure: parse_var(&lookup, "PORTAL_COOKIE_SECURE", defaults.cookie_secure)?,
            lookup_timeout_ms: parse_var(
                &lookup,
                "PORTAL_LOOKUP_TIMEOUT_MS",
                defaults.lookup_timeout_ms,
            )?,
            cors_origins,
            database,
        })
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_secs.min(MAX_SESSION_TTL_SECS) as i64)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

/// Initialize logging for the web server
pub fn init_logging(level: &str, format: LogFormat) {
    let config = LoggingConfig {
        format,
        ..LoggingConfig::with_level(level)
    };

    if let Err(e) = portal_core::init_logging(&config) {
        eprintln!("⚠️  Failed to initialize logging: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults_to_memory() {
        let config = WebConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.address(), "127.0.0.1:8080");
        assert_eq!(config.session_ttl_secs, 86_400);
        assert!(matches!(config.database, DatabaseSource::Memory));
    }

    #[test]
    fn test_database_url_wins() {
        let config = WebConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://u:p@db/portal"),
            ("DB_HOST", "ignored"),
        ]))
        .unwrap();

        assert!(
            matches!(config.database, DatabaseSource::Url(ref url) if url == "postgres://u:p@db/portal")
        );
    }

    #[test]
    fn test_db_host_selects_profile() {
        let config = WebConfig::from_lookup(lookup_from(&[
            ("DB_HOST", "db.internal"),
            ("PORTAL_PORT", "9000"),
            ("PORTAL_CORS_ORIGINS", "https://admin.example.com, https://ops.example.com"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.cors_origins.len(), 2);
        match config.database {
            DatabaseSource::Profile(profile) => assert_eq!(profile.host, "db.internal"),
            other => panic!("unexpected database source: {:?}", other),
        }
    }

    #[test]
    fn test_production_without_settings_fails() {
        let result = WebConfig::from_lookup(lookup_from(&[("APP_ENV", "production")]));
        assert!(matches!(result, Err(WebError::Core(_))));
    }

    #[test]
    fn test_node_env_production_selects_profile() {
        let result = WebConfig::from_lookup(lookup_from(&[("NODE_ENV", "production")]));
        assert!(matches!(result, Err(WebError::Core(_))));
    }

    #[test]
    fn test_wildcard_cors_origin_is_rejected() {
        for raw in ["*", "https://admin.example.com, *"] {
            let result = WebConfig::from_lookup(lookup_from(&[("PORTAL_CORS_ORIGINS", raw)]));
            assert!(matches!(result, Err(WebError::Config(ref m)) if m.contains("PORTAL_CORS_ORIGINS")));
        }

        let result =
            WebConfig::from_lookup(lookup_from(&[("PORTAL_CORS_ORIGINS", "https://bad\norigin")]));
        assert!(matches!(result, Err(WebError::Config(_))));
    }

    #[test]
    fn test_configured_origins_build_an_app() {
        let config = WebConfig::from_lookup(lookup_from(&[(
            "PORTAL_CORS_ORIGINS",
            "https://admin.example.com",
        )]))
        .unwrap();
        assert_eq!(config.cors_origins, vec!["https://admin.example.com"]);

        let state = AppState::with_stores(
            config,
            std::sync::Arc::new(auth::users::MemoryAdminStore::new()),
            std::sync::Arc::new(sessions::MemorySessionStore::new()),
        );
        let _app = create_app(state);
    }

    #[test]
    fn test_invalid_port_fails() {
        let result = WebConfig::from_lookup(lookup_from(&[("PORTAL_PORT", "eighty")]));
        assert!(matches!(result, Err(WebError::Config(_))));
    }
}
