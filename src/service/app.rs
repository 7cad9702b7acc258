//! Application state: item store, vote service, metrics and background tasks
//!
//! This module contains the production AppState that wires the item store,
//! the voting service and metrics together, and runs background tasks.

use crate::config::{validate_config, AppConfig};
use crate::metrics::MetricsCollector;
use crate::store::{seed_store, InMemoryItemStore, ItemStore, SeedCatalog, SeedSummary};
use crate::types::Category;
use crate::voting::{PairSelector, VoteService};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const HEALTH_METRICS_INTERVAL: Duration = Duration::from_secs(30);

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Seeding error: {message}")]
    Seed { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Background task error: {message}")]
    BackgroundTask { message: String },
}

/// Everything the HTTP handlers and background tasks share
pub struct AppState {
        config: AppConfig,

    /// Server of record for items, ratings and votes
    store: Arc<InMemoryItemStore>,

    /// Vote submission and pair selection
    vote_service: Arc<VoteService>,

    metrics: Arc<MetricsCollector>,

    started_at: Instant,

    /// Aborted on shutdown
    background_tasks: Mutex<Vec<JoinHandle<()>>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,
}

impl AppState {
    /// Initialize the application, seeding the store if a catalog is configured
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing clash-compare voting service");

        validate_config(&config).map_err(|e| ServiceError::Configuration {
            message: e.to_string(),
        })?;

        let store = Arc::new(InMemoryItemStore::default());
        match &config.store.seed_file {
            Some(path) => {
                let summary = Self::seed_from_file(&store, path, config.store.initial_rating)?;
                info!(
                    "Loaded {} cards and {} emotes from {}",
                    summary.cards,
                    summary.emotes,
                    path.display()
                );
            }
            None => warn!("No seed file configured - item store starts empty"),
        }

        Self::with_store(config, store)
    }

    /// Build the application around an existing store
    pub fn with_store(
        config: AppConfig,
        store: Arc<InMemoryItemStore>,
    ) -> Result<Self, ServiceError> {
        let metrics =
            Arc::new(
                MetricsCollector::new().map_err(|e| ServiceError::Initialization {
                    message: format!("Failed to create metrics collector: {}", e),
                })?,
            );

        let vote_service = VoteService::new(store.clone(), *store.tables())
            .with_settle_delay(config.settle_delay())
            .with_pair_selector(PairSelector::new(config.voting.pair_retry_attempts))
            .with_metrics(metrics.clone());

        Ok(Self {
            config,
            store,
            vote_service: Arc::new(vote_service),
            metrics,
            started_at: Instant::now(),
            background_tasks: Mutex::new(Vec::new()),
            is_running: Arc::new(RwLock::new(false)),
        })
    }

    fn seed_from_file(
        store: &InMemoryItemStore,
        path: &Path,
        initial_rating: f64,
    ) -> Result<SeedSummary, ServiceError> {
        let catalog = SeedCatalog::from_file(path).map_err(|e| ServiceError::Seed {
            message: e.to_string(),
        })?;

        seed_store(store, &catalog, initial_rating).map_err(|e| ServiceError::Seed {
            message: e.to_string(),
        })
    }

    /// Mark the service as running and start background tasks
    pub async fn start(&self) -> Result<(), ServiceError> {
        {
            let mut is_running = self.is_running.write().await;
            if *is_running {
                warn!("Service already running");
                return Ok(());
            }
            *is_running = true;
        }

        info!("Starting clash-compare voting service");

        let health_metrics_task = {
            let store = self.store.clone();
            let metrics = self.metrics.clone();
            let is_running = self.is_running.clone();
            let started_at = self.started_at;

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(HEALTH_METRICS_INTERVAL);
                info!("Health metrics task started");

                while *is_running.read().await {
                    interval.tick().await;

                    metrics.update_uptime(started_at.elapsed());

                    let mut status = 2;
                    for category in Category::ALL {
                        match store.item_count(category).await {
                            Ok(count) if count < 2 => status = status.min(1),
                            Ok(_) => {}
                            Err(e) => {
                                warn!("Item count for {} failed: {}", category, e);
                                status = 0;
                            }
                        }
                    }
                    metrics.update_health_status(status);
                    metrics.update_component_health("item_store", status > 0);

                    debug!(
                        "Updated service health metrics - uptime: {}s, status: {}",
                        started_at.elapsed().as_secs(),
                        status
                    );
                }

                info!("Health metrics task stopped");
            })
        };

        self.background_tasks.lock().await.push(health_metrics_task);

        info!("✅ Clash-compare voting service started successfully");
        Ok(())
    }

    /// Stop background tasks and log the final vote count
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of clash-compare service");

        *self.is_running.write().await = false;

        let tasks: Vec<JoinHandle<()>> = self.background_tasks.lock().await.drain(..).collect();
        let task_count = tasks.len();
        for (i, task) in tasks.into_iter().enumerate() {
            debug!("Aborting background task {}/{}", i + 1, task_count);
            task.abort();
        }

        let votes = self
            .store
            .vote_count()
            .map_err(|e| ServiceError::BackgroundTask {
                message: format!("Failed to get final stats: {}", e),
            })?;

        info!("Final service statistics: {} votes recorded", votes);
        info!("✅ Clash-compare service shutdown completed");
        Ok(())
    }

        pub fn config(&self) -> &AppConfig {
        &self.config
    }

        pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    pub fn store(&self) -> Arc<InMemoryItemStore> {
        self.store.clone()
    }

    /// The store behind its query interface
    pub fn item_store(&self) -> Arc<dyn ItemStore> {
        self.store.clone()
    }

    pub fn vote_service(&self) -> Arc<VoteService> {
        self.vote_service.clone()
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
