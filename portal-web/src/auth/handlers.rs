//! Authentication handlers for admin login, logout and session inspection

use super::{AuthError, CurrentAdmin, SessionIdentityResolver};
use crate::{
    sessions::{generate_session_id, SESSION_COOKIE},
    AppState, WebConfig,
};
use axum::{extract::State, response::Json, Json as JsonExtractor};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use portal_core::{AdminInfo, SessionData};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Admin login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Admin login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub admin: AdminInfo,
    pub expires_at: DateTime<Utc>,
}

fn session_cookie(sid: String, config: &WebConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, sid))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .build()
}

fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Admin login endpoint
///
/// Verify email and password, then start a new session that stores only the
/// admin id. Wrong email and wrong password produce the same response.
pub async fn login_admin(
    State(app_state): State<AppState>,
    jar: CookieJar,
    JsonExtractor(request): JsonExtractor<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AuthError> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    info!("Admin login attempt");

    let admin = match app_state
        .verifier
        .verify(&request.email, &request.password)
        .await
    {
        Ok(admin) => admin,
        Err(e) if e.is_authentication_failure() => {
            warn!(reason = %e, "Admin login rejected");
            return Err(AuthError::InvalidCredentials);
        }
        Err(e) => {
            warn!(error = %e, "Admin login failed: store unavailable");
            return Err(e);
        }
    };

    // Never reuse a session id across logins
    if let Some(previous) = jar.get(SESSION_COOKIE) {
        if let Err(e) = app_state.sessions.destroy(previous.value()).await {
            warn!("Failed to destroy previous session: {}", e);
        }
    }

    let sid = generate_session_id();
    let key = SessionIdentityResolver::extract(&admin);
    let expires_at = Utc::now() + app_state.config.session_ttl();

    app_state
        .sessions
        .save(&sid, &SessionData::authenticated(key), expires_at)
        .await?;

    info!(admin_id = admin.id, "Admin logged in successfully");

    let jar = jar.add(session_cookie(sid, &app_state.config));
    Ok((
        jar,
        Json(LoginResponse {
            admin: admin.to_info(),
            expires_at,
        }),
    ))
}

/// Logout endpoint
///
/// Destroys the server-side session and expires the cookie. Calling it
/// without a session is not an error.
pub async fn logout_admin(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), AuthError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        app_state.sessions.destroy(cookie.value()).await?;
        info!("Admin session destroyed");
    }

    Ok((
        jar.remove(removal_cookie()),
        Json(json!({ "message": "Logged out successfully" })),
    ))
}

/// Get current admin information
///
/// The admin is reloaded from the store on every call.
pub async fn get_current_admin(CurrentAdmin(admin): CurrentAdmin) -> Json<AdminInfo> {
    Json(admin.to_info())
}
