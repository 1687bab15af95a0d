//! Admin authentication: credential checks, session identity and extractors

pub mod credentials;
#[cfg(feature = "postgres")]
pub mod database;
pub mod errors;
pub mod handlers;
pub mod password;
pub mod session;
pub mod users;


pub use credentials::CredentialVerifier;
pub use errors::AuthError;
pub use session::{SessionIdentityResolver, SessionState};

use crate::{sessions::SESSION_COOKIE, AppState};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use portal_core::{AdminIdentity, AdminStore, CoreError, ErrorContext, LookupCriteria};
use std::time::Duration;
use tracing::{debug, warn};

/// Default bound on a single admin lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Run one store lookup, turning failures and timeouts into `StoreUnavailable`
pub(crate) async fn find_admin(
    store: &dyn AdminStore,
    criteria: &LookupCriteria,
    lookup_timeout: Duration,
) -> Result<Option<AdminIdentity>, AuthError> {
    match tokio::time::timeout(lookup_timeout, store.find_one_by(criteria)).await {
        Ok(result) => result.map_err(AuthError::from),
        Err(_) => Err(AuthError::from(CoreError::Timeout {
            operation: format!("admin lookup by {}", criteria.field()),
            duration_ms: lookup_timeout.as_millis() as u64,
            context: ErrorContext::new("auth").with_operation("find_admin"),
        })),
    }
}

/// Resolve the session cookie of a request into a session state
///
/// A session whose admin no longer exists is destroyed so the next request
/// starts out anonymous.
pub async fn resolve_request_session(
    state: &AppState,
    jar: &CookieJar,
) -> Result<SessionState, AuthError> {
    let Some(sid) = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string()) else {
        return Ok(SessionState::Anonymous);
    };

    let key = state.sessions.load(&sid).await?.and_then(|data| data.admin);
    let session_state = state.resolver.resolve(key).await?;

    if session_state == SessionState::Invalid {
        warn!("Session references a missing admin, clearing it");
        if let Err(e) = state.sessions.destroy(&sid).await {
            warn!("Failed to destroy stale session: {}", e);
        }
    }

    Ok(session_state)
}

/// Optional admin extractor - anonymous and stale sessions yield `None`
pub struct OptionalAdmin(pub Option<AdminIdentity>);

impl<S> FromRequestParts<S> for OptionalAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let session_state = resolve_request_session(&app_state, &jar).await?;
        Ok(OptionalAdmin(session_state.into_admin()))
    }
}

/// Authenticated admin extractor
pub struct CurrentAdmin(pub AdminIdentity);

impl<S> FromRequestParts<S> for CurrentAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalAdmin(admin) = OptionalAdmin::from_request_parts(parts, state).await?;

        match admin {
            Some(admin) => Ok(CurrentAdmin(admin)),
            None => {
                debug!("Rejecting request without an authenticated admin");
                Err(AuthError::Unauthenticated)
            }
        }
    }
}
