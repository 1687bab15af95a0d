//! Authentication errors and their HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use portal_core::CoreError;
use serde_json::json;

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Admin not in session")]
    SessionPrincipalMissing,
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Missing credentials")]
    MissingCredentials,
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AuthError {
    /// Wrong email or wrong password, as opposed to a degraded system
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, AuthError::UserNotFound | AuthError::InvalidCredentials)
    }
}

impl From<CoreError> for AuthError {
    fn from(err: CoreError) -> Self {
        err.log();
        AuthError::StoreUnavailable(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Both credential failures share one body so callers cannot tell them apart
        let (status, error_code, message) = match self {
            AuthError::UserNotFound | AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid email or password",
            ),
            AuthError::SessionPrincipalMissing | AuthError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "Authentication required",
            ),
            AuthError::MissingCredentials => (
                StatusCode::BAD_REQUEST,
                "missing_credentials",
                "Email and password are required",
            ),
            AuthError::StoreUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                "Authentication service is temporarily unavailable",
            ),
        };

        let body = Json(json!({
            "error": error_code,
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_failures_share_a_response() {
        let not_found = AuthError::UserNotFound.into_response();
        let invalid = AuthError::InvalidCredentials.into_response();

        assert_eq!(not_found.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(not_found.status(), invalid.status());
    }

    #[test]
    fn test_store_unavailable_is_not_an_auth_failure() {
        let err = AuthError::StoreUnavailable("connection refused".into());
        assert!(!err.is_authentication_failure());
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

        assert!(AuthError::UserNotFound.is_authentication_failure());
        assert!(AuthError::InvalidCredentials.is_authentication_failure());
        assert!(!AuthError::SessionPrincipalMissing.is_authentication_failure());
    }
}
