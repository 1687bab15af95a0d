//! Core data types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Admin identifier as assigned by the store
pub type AdminId = i64;

/// Stored admin record
///
/// Emails are compared exactly (case-sensitive); the core never normalizes them.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    /// Immutable identifier
    pub id: AdminId,
    /// Unique login email
    pub email: String,
    /// Salted one-way hash in PHC string format
    pub password_hash: String,
}

impl AdminIdentity {
    pub fn new(id: AdminId, email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Public view of the identity, safe to return to clients
    pub fn to_info(&self) -> AdminInfo {
        AdminInfo {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

impl fmt::Debug for AdminIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminIdentity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[redacted]")
            .finish()
    }
}

/// Admin information without credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminInfo {
    pub id: AdminId,
    pub email: String,
}

/// Minimal value persisted in a session to reload the admin later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(pub AdminId);

impl SessionKey {
    pub fn admin_id(&self) -> AdminId {
        self.0
    }
}

impl From<&AdminIdentity> for SessionKey {
    fn from(identity: &AdminIdentity) -> Self {
        SessionKey(identity.id)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Single-field lookup criteria for the admin store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupCriteria {
    Email(String),
    Id(AdminId),
}

impl LookupCriteria {
    /// Column the criteria filters on
    pub fn field(&self) -> &'static str {
        match self {
            LookupCriteria::Email(_) => "email",
            LookupCriteria::Id(_) => "id",
        }
    }

    /// Check whether an identity satisfies the criteria
    pub fn matches(&self, identity: &AdminIdentity) -> bool {
        match self {
            LookupCriteria::Email(email) => identity.email == *email,
            LookupCriteria::Id(id) => identity.id == *id,
        }
    }
}

/// Data serialized into the `sess` column of a session row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Authenticated admin, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<SessionKey>,
}

impl SessionData {
    pub fn authenticated(key: SessionKey) -> Self {
        Self { admin: Some(key) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password_hash() {
        let identity = AdminIdentity::new(1, "a@x.com", "$argon2id$v=19$secret");
        let debug = format!("{:?}", identity);
        assert!(debug.contains("a@x.com"));
        assert!(!debug.contains("argon2id"));
    }

    #[test]
    fn test_criteria_matching_is_case_sensitive() {
        let identity = AdminIdentity::new(7, "Admin@x.com", "hash");
        assert!(LookupCriteria::Email("Admin@x.com".into()).matches(&identity));
        assert!(!LookupCriteria::Email("admin@x.com".into()).matches(&identity));
        assert!(LookupCriteria::Id(7).matches(&identity));
        assert_eq!(LookupCriteria::Id(7).field(), "id");
    }

    #[test]
    fn test_session_data_serializes_only_the_admin_id() {
        let data = SessionData::authenticated(SessionKey(42));
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json, serde_json::json!({ "admin": 42 }));

        let empty: SessionData = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.admin, None);
    }
}
