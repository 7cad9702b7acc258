//! Prometheus metrics for votes, pair serving and store latency
//!
//! This module provides metrics collection for the clash-compare voting
//! service using Prometheus metrics.

use crate::rating::MatchOutcome;
use crate::types::Category;
use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the voting service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Vote-related metrics
    vote_metrics: VoteMetrics,

    /// Performance metrics
    performance_metrics: PerformanceMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
        pub uptime_seconds: IntGauge,

    /// Overall health as a gauge, see `HealthStatus::as_gauge`
    pub health_status: IntGauge,

    /// Per-component health, 1 when healthy
    pub component_health: IntGaugeVec,
}

/// Vote-related metrics
#[derive(Clone)]
pub struct VoteMetrics {
    /// Votes recorded, by category and outcome
    pub votes_total: IntCounterVec,

    /// Votes rejected or failed, by category and reason
    pub vote_errors_total: IntCounterVec,

    /// Pairs handed out for voting
    pub pairs_served_total: IntCounterVec,

    /// Ratings observed after each vote
    pub rating_distribution: HistogramVec,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// End-to-end vote submission time
    pub vote_processing_duration: Histogram,

    /// Store query durations
    pub store_operation_duration: HistogramVec,
}

impl MetricsCollector {
    /// Collector backed by a fresh registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Register every metric group on `registry`
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let vote_metrics = VoteMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            vote_metrics,
            performance_metrics,
        })
    }

    /// Registry to encode on `/metrics`
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get service metrics
    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    /// Get vote metrics
    pub fn votes(&self) -> &VoteMetrics {
        &self.vote_metrics
    }

        pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Record a successfully recorded vote
    pub fn record_vote(
        &self,
        category: Category,
        outcome: MatchOutcome,
        new_ratings: &[f64],
        duration: Duration,
    ) {
        let category_str = category.as_str();
        let outcome_str = match outcome {
            MatchOutcome::Draw => "draw",
            MatchOutcome::AWins | MatchOutcome::BWins => "decisive",
        };

        self.vote_metrics
            .votes_total
            .with_label_values(&[category_str, outcome_str])
            .inc();

        for rating in new_ratings {
            self.vote_metrics
                .rating_distribution
                .with_label_values(&[category_str])
                .observe(*rating);
        }

        self.performance_metrics
            .vote_processing_duration
            .observe(duration.as_secs_f64());
    }

    /// Record a rejected or failed vote
    pub fn record_vote_error(&self, category: Category, reason: &str) {
        self.vote_metrics
            .vote_errors_total
            .with_label_values(&[category.as_str(), reason])
            .inc();
    }

    /// Record a pair handed out for voting
    pub fn record_pair_served(&self, category: Category) {
        self.vote_metrics
            .pairs_served_total
            .with_label_values(&[category.as_str()])
            .inc();
    }

    /// Record store operation duration
    pub fn record_store_operation(&self, operation: &str, duration: Duration) {
        self.performance_metrics
            .store_operation_duration
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

        pub fn update_component_health(&self, component: &str, healthy: bool) {
        let status = if healthy { 1 } else { 0 };
        self.service_metrics
            .component_health
            .with_label_values(&[component])
            .set(status);
    }

    /// Update the uptime gauge
    pub fn update_uptime(&self, uptime: Duration) {
        self.service_metrics
            .uptime_seconds
            .set(uptime.as_secs() as i64);
    }

    /// Start timing an operation
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Wall-clock timer for store and vote operations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

        pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Consume the timer
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds =
            IntGauge::new("clash_compare_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let health_status = IntGauge::new(
            "clash_compare_health_status",
            "Overall service health: 0 unhealthy, 1 degraded, 2 healthy",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        let component_health = IntGaugeVec::new(
            Opts::new("clash_compare_component_health", "Component health status"),
            &["component"],
        )?;
        registry.register(Box::new(component_health.clone()))?;

        Ok(Self {
            uptime_seconds,
            health_status,
            component_health,
        })
    }
}

impl VoteMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let votes_total = IntCounterVec::new(
            Opts::new("clash_compare_votes_total", "Total votes recorded"),
            &["category", "outcome"],
        )?;
        registry.register(Box::new(votes_total.clone()))?;

        let vote_errors_total = IntCounterVec::new(
            Opts::new("clash_compare_vote_errors_total", "Total rejected or failed votes"),
            &["category", "reason"],
        )?;
        registry.register(Box::new(vote_errors_total.clone()))?;

        let pairs_served_total = IntCounterVec::new(
            Opts::new("clash_compare_pairs_served_total", "Total pairs served for voting"),
            &["category"],
        )?;
        registry.register(Box::new(pairs_served_total.clone()))?;

        let rating_distribution = HistogramVec::new(
            HistogramOpts::new(
                "clash_compare_rating_distribution",
                "Item ratings observed after each vote",
            )
            .buckets(vec![
                800.0, 900.0, 1000.0, 1100.0, 1200.0, 1300.0, 1400.0,
            ]),
            &["category"],
        )?;
        registry.register(Box::new(rating_distribution.clone()))?;

        Ok(Self {
            votes_total,
            vote_errors_total,
            pairs_served_total,
            rating_distribution,
        })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let vote_processing_duration = Histogram::with_opts(
            HistogramOpts::new(
                "clash_compare_vote_processing_duration_seconds",
                "Vote submission time",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0]),
        )?;
        registry.register(Box::new(vote_processing_duration.clone()))?;

        let store_operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "clash_compare_store_operation_duration_seconds",
                "Item store operation duration",
            )
            .buckets(vec![0.0001, 0.001, 0.005, 0.01, 0.05, 0.1]),
            &["operation"],
        )?;
        registry.register(Box::new(store_operation_duration.clone()))?;

        Ok(Self {
            vote_processing_duration,
            store_operation_duration,
        })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}
