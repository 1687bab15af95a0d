//! Schema migrations for the session and admin tables
//!
//! Every statement is idempotent, so running the migrations repeatedly is safe.

use crate::{db, DatabaseSource, WebError, WebResult};
use sqlx::PgPool;
use tracing::{error, info};

const CREATE_SESSION_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS "session" (
        "sid" varchar NOT NULL,
        "sess" json NOT NULL,
        "expire" timestamp(6) NOT NULL
    )
"#;

const ADD_SESSION_PRIMARY_KEY: &str = r#"
    DO $$
    BEGIN
        IF NOT EXISTS (
            SELECT constraint_name
            FROM information_schema.table_constraints
            WHERE table_name = 'session' AND constraint_name = 'session_pkey'
        ) THEN
            ALTER TABLE "session" ADD CONSTRAINT "session_pkey" PRIMARY KEY ("sid") NOT DEFERRABLE INITIALLY IMMEDIATE;
        END IF;
    END $$
"#;

const CREATE_SESSION_EXPIRE_INDEX: &str =
    r#"CREATE INDEX IF NOT EXISTS "IDX_session_expire" ON "session" ("expire")"#;

const CREATE_ADMIN_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS "admin" (
        "id" BIGSERIAL PRIMARY KEY,
        "email" varchar NOT NULL,
        "password" varchar NOT NULL
    )
"#;

const CREATE_ADMIN_EMAIL_INDEX: &str =
    r#"CREATE UNIQUE INDEX IF NOT EXISTS "UQ_admin_email" ON "admin" ("email")"#;

/// Ensure the session table, its primary key and its expiry index exist
pub async fn create_session_table(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in [
        CREATE_SESSION_TABLE,
        ADD_SESSION_PRIMARY_KEY,
        CREATE_SESSION_EXPIRE_INDEX,
    ] {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Ensure the admin table and its unique email index exist
pub async fn ensure_admin_table(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in [CREATE_ADMIN_TABLE, CREATE_ADMIN_EMAIL_INDEX] {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Apply every migration on an existing pool
pub async fn apply(pool: &PgPool) -> WebResult<()> {
    info!("Running session table migration...");
    create_session_table(pool).await.map_err(|e| {
        error!("Session table migration failed: {}", e);
        WebError::Database(format!("Session table migration failed: {}", e))
    })?;

    info!("Running admin table migration...");
    ensure_admin_table(pool).await.map_err(|e| {
        error!("Admin table migration failed: {}", e);
        WebError::Database(format!("Admin table migration failed: {}", e))
    })?;

    Ok(())
}

/// One-shot entry point: connect, migrate, and always close the pool
pub async fn run(source: &DatabaseSource) -> WebResult<()> {
    let pool = db::connect(source).await?;

    let result = apply(&pool).await;
    pool.close().await;

    if result.is_ok() {
        info!("✅ Migrations completed successfully");
    }
    result
}
