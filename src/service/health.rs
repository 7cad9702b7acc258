//! Service health: running flag, item store reachability and catalog size
//!
//! This module provides health check functionality for the clash-compare
//! voting service, including readiness and liveness probes.

use crate::service::app::AppState;
use crate::store::ItemStore;
use crate::types::Category;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Gauge value exported to Prometheus
    pub fn as_gauge(&self) -> u8 {
        match self {
            HealthStatus::Unhealthy => 0,
            HealthStatus::Degraded => 1,
            HealthStatus::Healthy => 2,
        }
    }

    /// Keep the worse of the two statuses
    fn merge(&mut self, other: &HealthStatus) {
        if other.as_gauge() < self.as_gauge() {
            *self = other.clone();
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "✅ healthy"),
            HealthStatus::Degraded => write!(f, "⚠️  degraded"),
            HealthStatus::Unhealthy => write!(f, "❌ unhealthy"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Worst status across components
    pub status: HealthStatus,
    /// Service name
    pub service: String,
    /// Crate version
    pub version: String,
    /// Current timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// One entry per checked component
    pub checks: Vec<ComponentCheck>,
    /// Service statistics
    pub stats: ServiceStats,
}

/// Result of checking one component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCheck {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Why the component is not healthy
    pub message: Option<String>,
    /// Wall time the check took, in milliseconds
    pub duration_ms: u64,
}

/// Catalog and vote counts reported alongside health
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceStats {
    /// Cards available for voting
    pub cards: usize,
    /// Emotes available for voting
    pub emotes: usize,
    /// Votes recorded since startup
    pub votes_recorded: usize,
    /// Seconds since the service state was created
    pub uptime_seconds: u64,
}

impl HealthCheck {
    /// Check every component and gather item and vote counts
    pub async fn check(app_state: Arc<AppState>) -> Result<Self> {
        let mut checks = Vec::new();
        let mut overall_status = HealthStatus::Healthy;

        let service_check = Self::check_service_running(&app_state).await;
        overall_status.merge(&service_check.status);
        checks.push(service_check);

        let store_check = Self::check_item_store(&app_state).await;
        overall_status.merge(&store_check.status);
        checks.push(store_check);

        let stats = Self::gather_service_stats(&app_state).await;

        Ok(HealthCheck {
            status: overall_status,
            service: app_state.config().service.name.clone(),
            version: crate::VERSION.to_string(),
            timestamp: chrono::Utc::now(),
            checks,
            stats,
        })
    }

    /// Alive means the running flag is set; the store is not queried
    pub async fn liveness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        if app_state.is_running().await {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy)
        }
    }

    /// Readiness check - verify service can handle votes
    pub async fn readiness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        if !app_state.is_running().await {
            return Ok(HealthStatus::Unhealthy);
        }

        Ok(Self::check_item_store(&app_state).await.status)
    }

        async fn check_service_running(app_state: &AppState) -> ComponentCheck {
        let start = std::time::Instant::now();

        let (status, message) = if app_state.is_running().await {
            (HealthStatus::Healthy, None)
        } else {
            (
                HealthStatus::Unhealthy,
                Some("Service is not running".to_string()),
            )
        };

        ComponentCheck {
            name: "service_running".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Check that every category can produce a pair
    async fn check_item_store(app_state: &AppState) -> ComponentCheck {
        let start = std::time::Instant::now();
        let store = app_state.store();

        let mut status = HealthStatus::Healthy;
        let mut problems = Vec::new();

        for category in Category::ALL {
            match store.item_count(category).await {
                Ok(count) if count < 2 => {
                    status.merge(&HealthStatus::Degraded);
                    problems.push(format!("only {} {} available", count, category));
                }
                Ok(_) => {}
                Err(e) => {
                    error!("Item store check failed for {}: {}", category, e);
                    status.merge(&HealthStatus::Unhealthy);
                    problems.push(format!("{} query failed: {}", category, e));
                }
            }
        }

        app_state
            .metrics()
            .update_component_health("item_store", status != HealthStatus::Unhealthy);

        ComponentCheck {
            name: "item_store".to_string(),
            status,
            message: if problems.is_empty() {
                None
            } else {
                Some(problems.join("; "))
            },
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

        async fn gather_service_stats(app_state: &AppState) -> ServiceStats {
        let store = app_state.store();

        ServiceStats {
            cards: store.item_count(Category::Cards).await.unwrap_or(0),
            emotes: store.item_count(Category::Emotes).await.unwrap_or(0),
            votes_recorded: store.vote_count().unwrap_or(0),
            uptime_seconds: app_state.uptime().as_secs(),
        }
    }
}

/// Pretty JSON, as printed by `--health-check`
impl HealthCheck {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("health report is not serializable: {}", e))
    }
}
