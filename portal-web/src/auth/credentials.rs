//! Email/password verification against the admin store

use super::{find_admin, password::verify_password, AuthError, DEFAULT_LOOKUP_TIMEOUT};
use portal_core::{AdminIdentity, AdminStore, LookupCriteria};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::debug;

/// Hash checked when the email is unknown so both failure paths pay for one verification
static DECOY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| super::password::hash_password("decoy-password").ok());

/// Local login strategy keyed on email
#[derive(Clone)]
pub struct CredentialVerifier {
    store: Arc<dyn AdminStore>,
    lookup_timeout: Duration,
}

impl CredentialVerifier {
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

    /// Check an email/password pair and return the matching admin unchanged
    pub async fn verify(&self, email: &str, password: &str) -> Result<AdminIdentity, AuthError> {
        let criteria = LookupCriteria::Email(email.to_string());
        let Some(admin) = find_admin(self.store.as_ref(), &criteria, self.lookup_timeout).await?
        else {
            if let Some(decoy) = DECOY_HASH.as_deref() {
                verify_password(password, decoy);
            }
            debug!("No admin registered for the supplied email");
            return Err(AuthError::UserNotFound);
        };

        if !verify_password(password, &admin.password_hash) {
            debug!(admin_id = admin.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        debug!(admin_id = admin.id, "Admin credentials verified");
        Ok(admin)
    }
}
