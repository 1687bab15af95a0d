//! Database connection profiles
//!
//! `APP_ENV=production` selects the production profile, which requires every
//! connection setting to be provided. `NODE_ENV` is read when `APP_ENV` is
//! unset, so older deployments keep their profile. Any other value falls back
//! to the development profile with local defaults.

use crate::config_error;
use crate::error::CoreResult;
use serde::{Deserialize, Serialize};

const DEFAULT_PORT: u16 = 5432;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Development,
}

/// Variables naming the environment, in priority order
const ENVIRONMENT_VARS: [&str; 2] = ["APP_ENV", "NODE_ENV"];

impl Environment {
    fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        }
    }

    /// Environment named by `APP_ENV`, or `NODE_ENV` when `APP_ENV` is unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = ENVIRONMENT_VARS
            .iter()
            .find_map(|key| lookup(key).filter(|value| !value.is_empty()));

        Self::from_value(value.as_deref())
    }
}

/// PostgreSQL connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    /// Schema auto-sync is never enabled; migrations are explicit
    pub synchronize: bool,
    /// Log every statement
    pub logging: bool,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("environment", &self.environment)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("database", &self.database)
            .field("synchronize", &self.synchronize)
            .field("logging", &self.logging)
            .finish()
    }
}

impl DatabaseConfig {
    /// Load the profile selected by the process environment
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the profile from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let environment = Environment::from_lookup(&lookup);
        let port = match var("DB_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| config_error!(format!("Invalid DB_PORT: {}", raw), "database_config"))?,
            None => DEFAULT_PORT,
        };

        match environment {
            Environment::Production => {
                let required = |key: &str| {
                    var(key).ok_or_else(|| {
                        config_error!(
                            format!("{} is required in production", key),
                            "database_config"
                        )
                    })
                };

                Ok(Self {
                    environment,
                    host: required("DB_HOST")?,
                    port,
                    username: required("DB_USERNAME")?,
                    password: required("DB_PASSWORD")?,
                    database: required("DB_DATABASE")?,
                    synchronize: false,
                    logging: false,
                })
            }
            Environment::Development => Ok(Self {
                environment,
                host: var("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
                port,
                username: var("DB_USERNAME").unwrap_or_else(|| "postgres".to_string()),
                password: var("DB_PASSWORD").unwrap_or_else(|| "password".to_string()),
                database: var("DB_DATABASE").unwrap_or_else(|| "tenant_portal".to_string()),
                synchronize: false,
                logging: true,
            }),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_development_defaults() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.username, "postgres");
        assert_eq!(config.password, "password");
        assert_eq!(config.database, "tenant_portal");
        assert!(config.logging);
        assert!(!config.synchronize);
    }

    #[test]
    fn test_development_overrides() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[
            ("APP_ENV", "staging"),
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
        ]))
        .unwrap();

        assert!(!config.is_production());
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 6543);
        assert_eq!(config.database, "tenant_portal");
    }

    #[test]
    fn test_production_requires_settings() {
        let result = DatabaseConfig::from_lookup(lookup_from(&[
            ("APP_ENV", "production"),
            ("DB_HOST", "db.prod"),
        ]));

        let err = result.unwrap_err();
        assert!(err.to_string().contains("DB_USERNAME"));
    }

    #[test]
    fn test_production_profile() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[
            ("APP_ENV", "production"),
            ("DB_HOST", "db.prod"),
            ("DB_USERNAME", "portal"),
            ("DB_PASSWORD", "p@ss word"),
            ("DB_DATABASE", "portal_prod"),
        ]))
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.port, 5432);
        assert!(!config.logging);
        assert_eq!(config.username, "portal");
        assert_eq!(config.password, "p@ss word");
        assert_eq!(config.database, "portal_prod");
    }

    #[test]
    fn test_node_env_selects_production() {
        let result = DatabaseConfig::from_lookup(lookup_from(&[("NODE_ENV", "production")]));
        assert!(result.unwrap_err().to_string().contains("DB_HOST"));

        assert_eq!(
            Environment::from_lookup(lookup_from(&[("NODE_ENV", "production")])),
            Environment::Production
        );
        assert_eq!(
            Environment::from_lookup(lookup_from(&[
                ("APP_ENV", "development"),
                ("NODE_ENV", "production"),
            ])),
            Environment::Development
        );
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = DatabaseConfig::from_lookup(lookup_from(&[("DB_PORT", "not-a-port")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[])).unwrap();
        assert!(!format!("{:?}", config).contains("\"password\""));
    }
}
