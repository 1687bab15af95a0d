//! Server-side session persistence
//!
//! A session maps an opaque random id, carried in the `portal.sid` cookie, to
//! a [`SessionData`] value and an expiry. Only the admin id is stored; the
//! admin itself is reloaded on every request.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use portal_core::{async_trait, CoreResult, SessionData};
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "portal.sid";

/// Generate a random 256-bit session id
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Session persistence capability
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load an unexpired session
    async fn load(&self, sid: &str) -> CoreResult<Option<SessionData>>;

    /// Create or replace a session
    async fn save(&self, sid: &str, data: &SessionData, expire: DateTime<Utc>) -> CoreResult<()>;

    /// Delete a session; deleting an unknown id is not an error
    async fn destroy(&self, sid: &str) -> CoreResult<()>;

    /// Delete every expired session, returning how many were removed
    async fn prune_expired(&self) -> CoreResult<u64>;
}

#[derive(Debug, Clone)]
struct StoredSession {
    data: SessionData,
    expire: DateTime<Utc>,
}

/// In-memory session store
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, StoredSession>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, sid: &str) -> CoreResult<Option<SessionData>> {
        let sessions = self.sessions.read().await;
        let now = Utc::now();

        Ok(sessions
            .get(sid)
            .filter(|session| session.expire > now)
            .map(|session| session.data.clone()))
    }

    async fn save(&self, sid: &str, data: &SessionData, expire: DateTime<Utc>) -> CoreResult<()> {
        self.sessions.write().await.insert(
            sid.to_string(),
            StoredSession {
                data: data.clone(),
                expire,
            },
        );
        Ok(())
    }

    async fn destroy(&self, sid: &str) -> CoreResult<()> {
        self.sessions.write().await.remove(sid);
        Ok(())
    }

    async fn prune_expired(&self) -> CoreResult<u64> {
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        let before = sessions.len();

        sessions.retain(|_, session| session.expire > now);

        let removed = (before - sessions.len()) as u64;
        debug!("Pruned {} expired sessions", removed);
        Ok(removed)
    }
}

#[cfg(feature = "postgres")]
pub use pg::PgSessionStore;

#[cfg(feature = "postgres")]
mod pg {
    use super::SessionStore;
    use chrono::{DateTime, Utc};
    use portal_core::{async_trait, CoreError, CoreResult, SessionData};
    use sqlx::{types::Json, PgPool};
    use tracing::{debug, error};

    /// Session store over the `session` table
    ///
    /// `expire` is a `timestamp` without time zone and always holds UTC.
    #[derive(Debug, Clone)]
    pub struct PgSessionStore {
        pool: PgPool,
    }

    impl PgSessionStore {
        pub fn new(pool: PgPool) -> Self {
            Self { pool }
        }
    }

    #[async_trait]
    impl SessionStore for PgSessionStore {
        async fn load(&self, sid: &str) -> CoreResult<Option<SessionData>> {
            let row: Option<(Json<SessionData>,)> =
                sqlx::query_as(r#"SELECT sess FROM "session" WHERE sid = $1 AND expire > $2"#)
                    .bind(sid)
                    .bind(Utc::now().naive_utc())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| {
                        error!("Failed to load session: {}", e);
                        CoreError::storage("session load failed", "pg_session_store", e)
                    })?;

            Ok(row.map(|(Json(data),)| data))
        }

        async fn save(
            &self,
            sid: &str,
            data: &SessionData,
            expire: DateTime<Utc>,
        ) -> CoreResult<()> {
            sqlx::query(
                r#"
                INSERT INTO "session" (sid, sess, expire)
                VALUES ($1, $2::json, $3)
                ON CONFLICT (sid) DO UPDATE SET sess = EXCLUDED.sess, expire = EXCLUDED.expire
                "#,
            )
            .bind(sid)
            .bind(Json(data))
            .bind(expire.naive_utc())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to save session: {}", e);
                CoreError::storage("session save failed", "pg_session_store", e)
            })?;

            Ok(())
        }

        async fn destroy(&self, sid: &str) -> CoreResult<()> {
            sqlx::query(r#"DELETE FROM "session" WHERE sid = $1"#)
                .bind(sid)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    error!("Failed to destroy session: {}", e);
                    CoreError::storage("session destroy failed", "pg_session_store", e)
                })?;

            Ok(())
        }

        async fn prune_expired(&self) -> CoreResult<u64> {
            let result = sqlx::query(r#"DELETE FROM "session" WHERE expire <= $1"#)
                .bind(Utc::now().naive_utc())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    error!("Failed to prune sessions: {}", e);
                    CoreError::storage("session prune failed", "pg_session_store", e)
                })?;

            debug!("Pruned {} expired sessions", result.rows_affected());
            Ok(result.rows_affected())
        }
    }
}
