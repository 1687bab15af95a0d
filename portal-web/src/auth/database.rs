//! Database-backed admin storage implementation

use portal_core::{async_trait, AdminIdentity, AdminStore, CoreError, CoreResult, LookupCriteria};
use sqlx::PgPool;
use tracing::{debug, error};

/// Database admin record
#[derive(Debug, sqlx::FromRow)]
struct AdminRecord {
    id: i64,
    email: String,
    password: String,
}

impl From<AdminRecord> for AdminIdentity {
    fn from(record: AdminRecord) -> Self {
        AdminIdentity::new(record.id, record.email, record.password)
    }
}

/// Admin store reading the `admin` table
///
/// Email uniqueness is enforced by the table's unique index. Should a legacy
/// table contain duplicates, the lowest id wins.
#[derive(Debug, Clone)]
pub struct PgAdminStore {
    pool: PgPool,
}

impl PgAdminStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminStore for PgAdminStore {
    async fn find_one_by(&self, criteria: &LookupCriteria) -> CoreResult<Option<AdminIdentity>> {
        let query = match criteria {
            LookupCriteria::Email(email) => sqlx::query_as::<_, AdminRecord>(
                r#"SELECT id::int8 AS id, email, password FROM "admin" WHERE email = $1 ORDER BY id LIMIT 1"#,
            )
            .bind(email.clone()),
            LookupCriteria::Id(id) => sqlx::query_as::<_, AdminRecord>(
                r#"SELECT id::int8 AS id, email, password FROM "admin" WHERE id = $1 LIMIT 1"#,
            )
            .bind(*id),
        };

        let record = query.fetch_optional(&self.pool).await.map_err(|e| {
            error!("Failed to query admin by {}: {}", criteria.field(), e);
            CoreError::storage(
                format!("admin lookup by {} failed", criteria.field()),
                "pg_admin_store",
                e,
            )
        })?;

        debug!(
            field = criteria.field(),
            found = record.is_some(),
            "Admin lookup completed"
        );
        Ok(record.map(AdminIdentity::from))
    }
}
