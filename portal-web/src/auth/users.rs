//! In-memory admin store for development and testing

use super::password::hash_password;
use portal_core::{
    async_trait, AdminId, AdminIdentity, AdminStore, CoreError, CoreResult, ErrorContext,
    LookupCriteria,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Admin store backed by a map keyed on id
///
/// Duplicate ids and emails are rejected at insert time, so lookups never
/// see more than one match.
#[derive(Debug, Clone, Default)]
pub struct MemoryAdminStore {
    admins: Arc<RwLock<BTreeMap<AdminId, AdminIdentity>>>,
}

impl MemoryAdminStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an existing identity
    pub async fn insert(&self, identity: AdminIdentity) -> CoreResult<()> {
        let mut admins = self.admins.write().await;
        Self::insert_locked(&mut admins, identity, "insert")
    }

    fn insert_locked(
        admins: &mut BTreeMap<AdminId, AdminIdentity>,
        identity: AdminIdentity,
        operation: &str,
    ) -> CoreResult<()> {
        if admins.contains_key(&identity.id) {
            return Err(CoreError::Duplicate {
                message: format!("admin id {} already exists", identity.id),
                context: ErrorContext::new("memory_admin_store").with_operation(operation),
            });
        }

        if admins.values().any(|admin| admin.email == identity.email) {
            return Err(CoreError::Duplicate {
                message: format!("email '{}' already registered", identity.email),
                context: ErrorContext::new("memory_admin_store").with_operation(operation),
            });
        }

        debug!(admin_id = identity.id, "Inserted admin");
        admins.insert(identity.id, identity);
        Ok(())
    }

    /// Hash the password and insert an admin with the next free id
    pub async fn create(&self, email: &str, password: &str) -> CoreResult<AdminIdentity> {
        let password_hash = hash_password(password).map_err(|e| CoreError::Storage {
            message: format!("failed to hash password: {}", e),
            source: None,
            context: ErrorContext::new("memory_admin_store").with_operation("create"),
        })?;

        // Id allocation and insert share one guard
        let mut admins = self.admins.write().await;
        let id = admins.keys().next_back().map_or(1, |last| last + 1);

        let identity = AdminIdentity::new(id, email, password_hash);
        Self::insert_locked(&mut admins, identity.clone(), "create")?;
        info!(admin_id = id, "Created admin");
        Ok(identity)
    }

    /// Replace a stored identity, keeping its id
    pub async fn update(&self, identity: AdminIdentity) -> CoreResult<()> {
        let mut admins = self.admins.write().await;

        if admins
            .values()
            .any(|admin| admin.id != identity.id && admin.email == identity.email)
        {
            return Err(CoreError::Duplicate {
                message: format!("email '{}' already registered", identity.email),
                context: ErrorContext::new("memory_admin_store").with_operation("update"),
            });
        }

        admins.insert(identity.id, identity);
        Ok(())
    }

    /// Remove an admin, returning it if it existed
    pub async fn remove(&self, id: AdminId) -> Option<AdminIdentity> {
        self.admins.write().await.remove(&id)
    }

    pub async fn len(&self) -> usize {
        self.admins.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.admins.read().await.is_empty()
    }
}

#[async_trait]
impl AdminStore for MemoryAdminStore {
    async fn find_one_by(&self, criteria: &LookupCriteria) -> CoreResult<Option<AdminIdentity>> {
        let admins = self.admins.read().await;

        let found = match criteria {
            LookupCriteria::Id(id) => admins.get(id).cloned(),
            LookupCriteria::Email(_) => admins.values().find(|a| criteria.matches(a)).cloned(),
        };

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let store = MemoryAdminStore::new();

        let first = store.create("a@x.com", "secret").await.unwrap();
        let second = store.create("b@x.com", "secret").await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = MemoryAdminStore::new();
        store.create("a@x.com", "secret").await.unwrap();

        let result = store.create("a@x.com", "other").await;
        assert!(matches!(result, Err(CoreError::Duplicate { .. })));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let store = MemoryAdminStore::new();
        store
            .insert(AdminIdentity::new(5, "a@x.com", "hash"))
            .await
            .unwrap();

        let result = store.insert(AdminIdentity::new(5, "b@x.com", "hash")).await;
        assert!(matches!(result, Err(CoreError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn test_find_one_by_email_and_id() {
        let store = MemoryAdminStore::new();
        let admin = store.create("a@x.com", "secret").await.unwrap();

        let by_email = store
            .find_one_by(&LookupCriteria::Email("a@x.com".into()))
            .await
            .unwrap();
        let by_id = store.find_one_by(&LookupCriteria::Id(admin.id)).await.unwrap();
        let missing = store.find_one_by(&LookupCriteria::Id(999)).await.unwrap();

        assert_eq!(by_email, Some(admin.clone()));
        assert_eq!(by_id, Some(admin));
        assert_eq!(missing, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_ids() {
        let store = MemoryAdminStore::new();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.create(&format!("admin{}@x.com", i), "secret").await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.sort_unstable();

        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
        assert_eq!(store.len().await, 8);
    }

    #[tokio::test]
    async fn test_update_rejects_taken_email() {
        let store = MemoryAdminStore::new();
        store.create("a@x.com", "secret").await.unwrap();
        let mut second = store.create("b@x.com", "secret").await.unwrap();

        second.email = "a@x.com".to_string();
        assert!(store.update(second).await.is_err());
    }
}
