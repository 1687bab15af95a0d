//! Application state shared by every request

use crate::{
    auth::{users::MemoryAdminStore, CredentialVerifier, SessionIdentityResolver},
    sessions::{MemorySessionStore, SessionStore},
    DatabaseSource, WebConfig, WebResult,
};
use portal_core::AdminStore;
use std::sync::Arc;
use tracing::{info, warn};

#[cfg(feature = "postgres")]
use crate::{auth::database::PgAdminStore, db, sessions::PgSessionStore};

/// Default admin seeded into the in-memory store in development mode
const DEV_ADMIN_EMAIL: &str = "admin@portal.local";
const DEV_ADMIN_PASSWORD: &str = "admin123";

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: WebConfig,
    /// Admin lookup capability
    pub admins: Arc<dyn AdminStore>,
    /// Session persistence
    pub sessions: Arc<dyn SessionStore>,
    /// Login strategy
    pub verifier: CredentialVerifier,
    /// Session serialize/deserialize pair
    pub resolver: SessionIdentityResolver,
}

impl AppState {
    /// Create application state, connecting to the configured database
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let (admins, sessions): (Arc<dyn AdminStore>, Arc<dyn SessionStore>) =
            match &config.database {
                DatabaseSource::Memory => {
                    let admins = MemoryAdminStore::new();

                    if config.dev_mode {
                        warn!(
                            "Seeding development admin '{}'; do not use in production",
                            DEV_ADMIN_EMAIL
                        );
                        admins.create(DEV_ADMIN_EMAIL, DEV_ADMIN_PASSWORD).await?;
                    }

                    info!("Using in-memory admin and session stores");
                    let admins: Arc<dyn AdminStore> = Arc::new(admins);
                    let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
                    (admins, sessions)
                }
                #[cfg(feature = "postgres")]
                source => {
                    let pool = db::connect(source).await?;
                    let admins: Arc<dyn AdminStore> = Arc::new(PgAdminStore::new(pool.clone()));
                    let sessions: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(pool));
                    (admins, sessions)
                }
                #[cfg(not(feature = "postgres"))]
                _ => {
                    return Err(crate::WebError::Config(
                        "Database support is disabled; rebuild with the `postgres` feature"
                            .to_string(),
                    ))
                }
            };

        Ok(Self::with_stores(config, admins, sessions))
    }

    /// Create application state around existing stores
    pub fn with_stores(
        config: WebConfig,
        admins: Arc<dyn AdminStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let verifier =
            CredentialVerifier::new(admins.clone()).with_lookup_timeout(config.lookup_timeout());
        let resolver = SessionIdentityResolver::new(admins.clone())
            .with_lookup_timeout(config.lookup_timeout());

        Self {
            config,
            admins,
            sessions,
            verifier,
            resolver,
        }
    }

    /// Remove expired sessions
    pub async fn cleanup_expired_sessions(&self) {
        match self.sessions.prune_expired().await {
            Ok(0) => {}
            Ok(removed) => info!("Removed {} expired sessions", removed),
            Err(e) => warn!("Failed to prune expired sessions: {}", e),
        }
    }
}
