//! PostgreSQL connection pool setup

use crate::{DatabaseSource, WebError, WebResult};
use log::LevelFilter;
use portal_core::DatabaseConfig;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    ConnectOptions, PgPool,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

fn profile_options(config: &DatabaseConfig) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.username)
        .password(&config.password)
        .database(&config.database);

    if config.logging {
        options.log_statements(LevelFilter::Debug)
    } else {
        options.disable_statement_logging()
    }
}

/// Open a pool for the configured database
pub async fn connect(source: &DatabaseSource) -> WebResult<PgPool> {
    let options = match source {
        DatabaseSource::Url(url) => PgConnectOptions::from_str(url)
            .map_err(|e| WebError::Config(format!("Invalid DATABASE_URL: {}", e)))?,
        DatabaseSource::Profile(config) => profile_options(config),
        DatabaseSource::Memory => {
            return Err(WebError::Config(
                "No database configured; set DATABASE_URL or DB_HOST".to_string(),
            ))
        }
    };

    info!(
        "🔗 Connecting to database {}:{}/{}",
        options.get_host(),
        options.get_port(),
        options.get_database().unwrap_or_default()
    );

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await
        .map_err(|e| WebError::Database(format!("Failed to connect to database: {}", e)))?;

    info!("✅ Database connection established successfully");
    Ok(pool)
}
