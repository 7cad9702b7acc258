//! HTTP server hosting the voting API and the health endpoints

use crate::api::routes::api_router;
use crate::metrics::{health_router, HealthServerState};
use crate::service::AppState;
use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Port to bind to
    pub port: u16,
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl HttpServerConfig {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Self {
        Self {
            port: config.service.http_port,
            host: config.service.http_host.clone(),
        }
    }
}

pub struct HttpServer {
    config: HttpServerConfig,
    app_state: Arc<AppState>,
    shutdown_tx: broadcast::Sender<()>,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, app_state: Arc<AppState>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            app_state,
            shutdown_tx,
        }
    }

    /// API and health routes merged into one router
    pub fn router(&self) -> Router {
        let health_state = HealthServerState::new(self.app_state.metrics())
            .with_app_state(self.app_state.clone());

        api_router(self.app_state.clone()).merge(health_router(health_state))
    }

    /// Serve until `stop` is called
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid HTTP server address")?;

        let app = self.router();
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("HTTP server listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("HTTP server shutdown signal received");
            })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Ask a running server to stop accepting connections
    pub fn stop(&self) {
        info!("Stopping HTTP server...");

        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to HTTP server: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::store::InMemoryItemStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_router_serves_api_and_health() {
        let app_state = Arc::new(
            AppState::with_store(AppConfig::default(), Arc::new(InMemoryItemStore::default()))
                .unwrap(),
        );
        let server = HttpServer::new(HttpServerConfig::default(), app_state);

        for (uri, expected) in [
            ("/", StatusCode::OK),
            ("/metrics", StatusCode::OK),
            ("/api/cards/leaderboard", StatusCode::OK),
            ("/alive", StatusCode::SERVICE_UNAVAILABLE),
        ] {
            let response = server
                .router()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), expected, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let app_state = Arc::new(
            AppState::with_store(AppConfig::default(), Arc::new(InMemoryItemStore::default()))
                .unwrap(),
        );
        let server = Arc::new(HttpServer::new(
            HttpServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
            },
            app_state,
        ));

        let handle = {
            let server = server.clone();
            tokio::spawn(async move { server.start().await })
        };

        // Retry until the server has subscribed to the shutdown channel
        for _ in 0..50 {
            if server.shutdown_tx.receiver_count() > 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        server.stop();

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
