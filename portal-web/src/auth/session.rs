//! Session identity serialization and reload

use super::{find_admin, AuthError, DEFAULT_LOOKUP_TIMEOUT};
use portal_core::{AdminIdentity, AdminStore, LookupCriteria, SessionKey};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Per-request authentication state derived from the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No session key stored
    Anonymous,
    /// Session key present and the admin reloaded
    Authenticated(AdminIdentity),
    /// Session key present but no longer maps to a live admin
    Invalid,
}

impl SessionState {
    pub fn admin(&self) -> Option<&AdminIdentity> {
        match self {
            SessionState::Authenticated(admin) => Some(admin),
            _ => None,
        }
    }

    pub fn into_admin(self) -> Option<AdminIdentity> {
        match self {
            SessionState::Authenticated(admin) => Some(admin),
            _ => None,
        }
    }
}

/// Turns admins into session keys and session keys back into admins
#[derive(Clone)]
pub struct SessionIdentityResolver {
    store: Arc<dyn AdminStore>,
    lookup_timeout: Duration,
}

impl SessionIdentityResolver {
    pub fn new(store: Arc<dyn AdminStore>) -> Self {
        Self {
            store,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Bound each store lookup
    pub fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    /// Value stored in the session after a successful login
    pub fn extract(identity: &AdminIdentity) -> SessionKey {
        SessionKey::from(identity)
    }

    /// Re-read the admin referenced by a session key
    pub async fn reload(&self, key: SessionKey) -> Result<AdminIdentity, AuthError> {
        let criteria = LookupCriteria::Id(key.admin_id());

        find_admin(self.store.as_ref(), &criteria, self.lookup_timeout)
            .await?
            .ok_or_else(|| {
                debug!(admin_id = key.admin_id(), "Session references a missing admin");
                AuthError::SessionPrincipalMissing
            })
    }

    /// Resolve an optional session key into a session state
    ///
    /// Only store failures are returned as errors.
    pub async fn resolve(&self, key: Option<SessionKey>) -> Result<SessionState, AuthError> {
        let Some(key) = key else {
            return Ok(SessionState::Anonymous);
        };

        match self.reload(key).await {
            Ok(admin) => Ok(SessionState::Authenticated(admin)),
            Err(AuthError::SessionPrincipalMissing) => Ok(SessionState::Invalid),
            Err(e) => Err(e),
        }
    }
}
