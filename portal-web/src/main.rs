//! Portal Web Server
//!
//! Admin authentication backend for the tenant portal.

use anyhow::Context;
use clap::{Parser, Subcommand};
use portal_core::LogFormat;
use portal_web::server::PortalServerBuilder;
use portal_web::{auth::password::hash_password, init_logging, DatabaseSource, WebConfig};

/// Portal Web Server - admin authentication and sessions for the tenant portal
#[derive(Parser)]
#[command(name = "portal-web")]
#[command(about = "Admin authentication backend for the tenant portal")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Database URL; overrides DATABASE_URL and the DB_* profile
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log format (pretty, compact, json)
    #[arg(long, global = true, default_value = "pretty")]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Server host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Server port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable development mode
        #[arg(long)]
        dev: bool,

        /// Use in-memory stores even if a database is configured
        #[arg(long)]
        memory: bool,
    },
    /// Create the session and admin tables if they do not exist
    Migrate,
    /// Print an Argon2 hash for provisioning an admin password
    HashPassword {
        /// Password to hash
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    init_logging(&args.log_level, args.log_format);

    let mut config = WebConfig::from_env().context("Failed to load configuration")?;
    if let Some(url) = args.database_url {
        config.database = DatabaseSource::Url(url);
    }

    match args.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
        dev: false,
        memory: false,
    }) {
        Command::Serve {
            host,
            port,
            dev,
            memory,
        } => {
            let mut builder = PortalServerBuilder::from_config(config);
            if let Some(host) = host {
                builder = builder.host(host);
            }
            if let Some(port) = port {
                builder = builder.port(port);
            }
            if dev {
                builder = builder.dev_mode(true);
            }
            if memory {
                builder = builder.in_memory();
            }

            let server = builder.build().await.context("Failed to build server")?;
            server.start().await.context("Server failed")?;
        }
        Command::Migrate => {
            #[cfg(feature = "postgres")]
            portal_web::migrations::run(&config.database)
                .await
                .context("Migration failed")?;

            #[cfg(not(feature = "postgres"))]
            anyhow::bail!("Migrations require the `postgres` feature");
        }
        Command::HashPassword { password } => {
            let hash = hash_password(&password)
                .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
            println!("{}", hash);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["portal-web"]);
        assert!(args.command.is_none());
        assert_eq!(args.log_level, "info");
        assert_eq!(args.log_format, LogFormat::Pretty);

        let args = Args::parse_from([
            "portal-web",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "3000",
            "--dev",
        ]);
        match args.command {
            Some(Command::Serve {
                host, port, dev, ..
            }) => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(3000));
                assert!(dev);
            }
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_migrate_and_hash_password_parsing() {
        let args = Args::parse_from([
            "portal-web",
            "migrate",
            "--database-url",
            "postgres://localhost/portal",
        ]);
        assert!(matches!(args.command, Some(Command::Migrate)));
        assert_eq!(
            args.database_url.as_deref(),
            Some("postgres://localhost/portal")
        );

        let args = Args::parse_from(["portal-web", "hash-password", "secret"]);
        assert!(matches!(
            args.command,
            Some(Command::HashPassword { ref password }) if password == "secret"
        ));
    }
}
