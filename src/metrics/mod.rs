//! Metrics and monitoring for the clash-compare voting service
//!
//! Prometheus metrics collection plus the health and metrics HTTP routes.

pub mod collector;
pub mod health;

pub use collector::{
    MetricsCollector, MetricsTimer, PerformanceMetrics, ServiceMetrics, VoteMetrics,
};
pub use health::{health_router, HealthServerState};
