//! Portal Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, DatabaseSource, WebConfig, WebError, WebResult};
use axum::serve;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

/// How often expired sessions are pruned
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Main portal web server
pub struct PortalServer {
    config: WebConfig,
    state: AppState,
}

impl PortalServer {
    /// Create a new server, connecting to the configured stores
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("🚀 Starting Portal Web Server");
        info!("📍 Server address: http://{}", address);
        info!("🔧 Development mode: {}", self.config.dev_mode);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("✅ Server listening on http://{}", address);

        // Start cleanup task for expired sessions
        let cleanup_state = self.state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                cleanup_state.cleanup_expired_sessions().await;
            }
        });

        if let Err(e) = serve(listener, app).await {
            error!("❌ Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }
}

/// Builder for PortalServer
pub struct PortalServerBuilder {
    config: WebConfig,
}

impl PortalServerBuilder {
    /// Start from an existing configuration
    pub fn from_config(config: WebConfig) -> Self {
        Self { config }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable development mode
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    /// Use the in-memory stores
    pub fn in_memory(mut self) -> Self {
        self.config.database = DatabaseSource::Memory;
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<PortalServer> {
        PortalServer::new(self.config).await
    }
}
