//! Health check endpoints and Prometheus metrics routes
//!
//! These routes are merged into the main HTTP server next to the voting API.

use crate::metrics::collector::MetricsCollector;
use crate::service::app::AppState;
use crate::service::health::{HealthCheck, HealthStatus};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

/// Shared state for the health routes
#[derive(Clone)]
pub struct HealthServerState {
    pub metrics_collector: Arc<MetricsCollector>,
    pub app_state: Option<Arc<AppState>>,
}

impl HealthServerState {
    pub fn new(metrics_collector: Arc<MetricsCollector>) -> Self {
        Self {
            metrics_collector,
            app_state: None,
        }
    }

    /// Attach the running application
    pub fn with_app_state(mut self, app_state: Arc<AppState>) -> Self {
        self.app_state = Some(app_state);
        self
    }
}

/// Router with all health and metrics endpoints
pub fn health_router(state: HealthServerState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/alive", get(alive_handler))
        .route("/metrics", get(metrics_handler))
        .route("/stats", get(stats_handler))
        .with_state(state)
}

/// Service name and route index
async fn root_handler() -> impl IntoResponse {
    let info = json!({
        "service": "clash-compare",
        "version": crate::VERSION,
        "endpoints": [
            "/health",
            "/ready",
            "/alive",
            "/metrics",
            "/stats",
            "/api/vote",
            "/api/predict",
            "/api/{category}/pair",
            "/api/{category}/leaderboard",
            "/api/{category}/items/{id}"
        ]
    });

    Json(info)
}

fn status_body(status: &str) -> serde_json::Value {
    json!({
        "status": status,
        "service": "clash-compare",
        "version": crate::VERSION
    })
}

/// Full health report as JSON
async fn health_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    debug!("GET /health");

    let Some(app_state) = &state.app_state else {
        let mut body = status_body("unhealthy");
        body["error"] = json!("Service not initialized");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(body));
    };

    match HealthCheck::readiness_check(app_state.clone()).await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, Json(status_body("healthy"))),
        Ok(HealthStatus::Degraded) => (StatusCode::OK, Json(status_body("degraded"))),
        Ok(HealthStatus::Unhealthy) | Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(status_body("unhealthy")),
        ),
    }
}

/// 200 once both categories can serve pairs
async fn ready_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    debug!("GET /ready");

    match &state.app_state {
        Some(app_state) => match HealthCheck::readiness_check(app_state.clone()).await {
            Ok(HealthStatus::Healthy) => (StatusCode::OK, "Ready"),
            Ok(HealthStatus::Degraded) => (StatusCode::OK, "Degraded but ready"),
            Ok(HealthStatus::Unhealthy) => (StatusCode::SERVICE_UNAVAILABLE, "Not ready"),
            Err(e) => {
                error!("Readiness check failed: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
            }
        },
        None => (StatusCode::SERVICE_UNAVAILABLE, "Service not initialized"),
    }
}

/// 200 while the service is running
async fn alive_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    debug!("GET /alive");

    match &state.app_state {
        Some(app_state) => match HealthCheck::liveness_check(app_state.clone()).await {
            Ok(HealthStatus::Healthy) => (StatusCode::OK, "Alive"),
            _ => (StatusCode::SERVICE_UNAVAILABLE, "Not alive"),
        },
        None => (StatusCode::SERVICE_UNAVAILABLE, "Service not initialized"),
    }
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<HealthServerState>) -> Response {
    debug!("GET /metrics");

    if let Some(app_state) = &state.app_state {
        state.metrics_collector.update_uptime(app_state.uptime());
    }

    let metric_families = state.metrics_collector.registry().gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(metrics_output) => {
            debug!("Serving {} metric families", metric_families.len());
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, encoder.format_type().to_string())],
                metrics_output,
            )
                .into_response()
        }
        Err(e) => {
            error!("Prometheus encoding failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
                .into_response()
        }
    }
}

/// Detailed service statistics endpoint handler
async fn stats_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    debug!("GET /stats");

    let Some(app_state) = &state.app_state else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "service": {
                    "name": "clash-compare",
                    "version": crate::VERSION,
                    "status": "error"
                },
                "error": "Service not initialized",
                "timestamp": chrono::Utc::now()
            })),
        );
    };

    match HealthCheck::check(app_state.clone()).await {
        Ok(health) => (
            StatusCode::OK,
            Json(json!({
                "service": {
                    "name": health.service,
                    "version": health.version,
                    "status": health.status,
                    "uptime_seconds": health.stats.uptime_seconds
                },
                "items": {
                    "cards": health.stats.cards,
                    "emotes": health.stats.emotes
                },
                "votes": {
                    "recorded": health.stats.votes_recorded
                },
                "components": health.checks,
                "timestamp": chrono::Utc::now()
            })),
        ),
        Err(e) => {
            error!("Could not gather item and vote counts: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "service": {
                        "name": "clash-compare",
                        "version": crate::VERSION,
                        "status": "error"
                    },
                    "error": "Item and vote counts unavailable",
                    "timestamp": chrono::Utc::now()
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::store::InMemoryItemStore;
    use crate::types::{Category, RatedItem};
    use axum::{body::Body, http::Request};
    use tower::ServiceExt; // for oneshot

    fn router_without_app() -> Router {
        let collector = Arc::new(MetricsCollector::new().expect("Failed to create collector"));
        health_router(HealthServerState::new(collector))
    }

    async fn running_app(items: Vec<RatedItem>) -> Arc<AppState> {
        let store = InMemoryItemStore::default();
        store.insert_items(items).unwrap();
        let app_state = AppState::with_store(AppConfig::default(), Arc::new(store)).unwrap();
        app_state.start().await.unwrap();
        Arc::new(app_state)
    }

    async fn get(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        assert_eq!(get(router_without_app(), "/").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let collector = Arc::new(MetricsCollector::new().expect("Failed to create collector"));
        collector.record_pair_served(Category::Cards);
        collector.update_health_status(2);

        let app = health_router(HealthServerState::new(collector));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().contains("text/plain"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("clash_compare_pairs_served_total"));
    }

    #[tokio::test]
    async fn test_health_endpoints_without_app_state() {
        let app = router_without_app();

        for uri in ["/health", "/ready", "/alive", "/stats"] {
            assert_eq!(
                get(app.clone(), uri).await,
                StatusCode::SERVICE_UNAVAILABLE,
                "{} should be unavailable",
                uri
            );
        }
    }

    #[tokio::test]
    async fn test_health_endpoints_with_running_app() {
        let app_state = running_app(vec![
            RatedItem::new(0, Category::Cards, "Knight"),
            RatedItem::new(1, Category::Cards, "Archers"),
            RatedItem::new(0, Category::Emotes, "Thumbs Up"),
            RatedItem::new(1, Category::Emotes, "Angry King"),
        ])
        .await;
        let app = health_router(
            HealthServerState::new(app_state.metrics()).with_app_state(app_state.clone()),
        );

        for uri in ["/health", "/ready", "/alive", "/stats"] {
            assert_eq!(get(app.clone(), uri).await, StatusCode::OK, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_empty_store_is_degraded_but_ready() {
        let app_state = running_app(Vec::new()).await;
        let app = health_router(
            HealthServerState::new(app_state.metrics()).with_app_state(app_state.clone()),
        );

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "degraded");
    }

    #[tokio::test]
    async fn test_404_handling() {
        assert_eq!(
            get(router_without_app(), "/nonexistent").await,
            StatusCode::NOT_FOUND
        );
    }
}
