//! Core trait definitions

use crate::error::CoreResult;
use crate::types::{AdminIdentity, LookupCriteria};
use async_trait::async_trait;

/// Read capability over the admin store
///
/// Returns at most one identity. Connectivity problems are reported as
/// `Err`, a missing record as `Ok(None)`.
#[async_trait]
pub trait AdminStore: Send + Sync {
    /// Find the single admin matching the criteria
    async fn find_one_by(&self, criteria: &LookupCriteria) -> CoreResult<Option<AdminIdentity>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct FixedStore(Vec<AdminIdentity>);

    #[async_trait]
    impl AdminStore for FixedStore {
        async fn find_one_by(
            &self,
            criteria: &LookupCriteria,
        ) -> CoreResult<Option<AdminIdentity>> {
            Ok(self.0.iter().find(|a| criteria.matches(a)).cloned())
        }
    }

    #[test]
    fn test_store_is_object_safe() {
        let store: Arc<dyn AdminStore> = Arc::new(FixedStore(vec![
            AdminIdentity::new(1, "a@x.com", "hash"),
            AdminIdentity::new(2, "b@x.com", "hash"),
        ]));

        let by_email = tokio_test::block_on(
            store.find_one_by(&LookupCriteria::Email("b@x.com".to_string())),
        )
        .unwrap();
        assert_eq!(by_email.map(|a| a.id), Some(2));

        let missing = tokio_test::block_on(store.find_one_by(&LookupCriteria::Id(3))).unwrap();
        assert!(missing.is_none());
    }
}
