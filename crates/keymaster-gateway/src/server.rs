//! HTTP gateway server.

use std::sync::Arc;

use axum::routing::{any, get};
use axum::Router;
use keymaster_core::config::ServerConfig;
use keymaster_store::CredentialRepository;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::GatewayError;
use crate::handlers::{self, HandlerContext};
use crate::Result;

/// Default gateway port.
pub const DEFAULT_PORT: u16 = 8080;

/// Gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Address or host name to bind.
    pub bind: String,

    /// Port number.
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl From<&ServerConfig> for GatewayConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            bind: config.bind.clone(),
            port: config.port,
        }
    }
}

/// The Keymaster HTTP gateway.
pub struct Gateway {
    config: GatewayConfig,
    context: HandlerContext,
}

impl Gateway {
    /// Create a gateway serving `repository`.
    pub fn new(config: GatewayConfig, repository: Arc<dyn CredentialRepository>) -> Self {
        Self {
            config,
            context: HandlerContext::new(repository),
        }
    }

    /// The gateway configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn run(&self) -> Result<()> {
        if !is_loopback(&self.config.bind) {
            warn!(
                bind = %self.config.bind,
                "gateway is reachable from the network and has no authentication"
            );
        }

        let listener = TcpListener::bind((self.config.bind.as_str(), self.config.port))
            .await
            .map_err(GatewayError::Io)?;
        info!("Starting gateway server on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))?;

        info!("Gateway server stopped");
        Ok(())
    }

    /// Serve on an already bound listener until the task is dropped.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        axum::serve(listener, self.router())
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))
    }

    /// Create the Axum router.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/credentials", any(handlers::credentials::collection))
            .route("/api/credentials/*tail", any(handlers::credentials::item))
            .route(
                "/api/apps",
                get(handlers::apps::list).fallback(handlers::not_found),
            )
            .route("/health", get(handlers::health::health))
            .fallback(handlers::not_found)
            .layer(TraceLayer::new_for_http())
            .with_state(self.context.clone())
    }
}

fn is_loopback(bind: &str) -> bool {
    bind == "localhost"
        || bind
            .parse::<std::net::IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
