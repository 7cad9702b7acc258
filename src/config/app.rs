//! Service, store and voting configuration
//!
//! This module defines the primary configuration structures for the
//! clash-compare voting service, including environment variable loading and
//! validation.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration, loadable from TOML or the environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub store: StoreSettings,
    pub voting: VotingSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Instance name shown in logs and health reports
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Interface the HTTP server binds to
    pub http_host: String,
    /// Port for the vote API and health endpoints
    pub http_port: u16,
    /// Upper bound on draining connections at shutdown
    pub shutdown_timeout_seconds: u64,
}

/// Item store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// JSON catalog loaded into the store at startup
    pub seed_file: Option<PathBuf>,
    /// Rating given to every seeded item
    pub initial_rating: f64,
}

/// Voting flow settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingSettings {
    /// Reshuffles allowed when the new pair repeats the previous one
    pub pair_retry_attempts: u32,
    /// Pause between recording a vote and reading back the ratings
    pub settle_delay_ms: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "clash-compare".to_string(),
            log_level: "info".to_string(),
            http_host: "0.0.0.0".to_string(),
            http_port: 8080,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            seed_file: None,
            initial_rating: crate::types::INITIAL_RATING,
        }
    }
}

impl Default for VotingSettings {
    fn default() -> Self {
        Self {
            pair_retry_attempts: 10,
            settle_delay_ms: 100,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `SERVICE_NAME`, `LOG_LEVEL`, `HTTP_PORT` and friends
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still win
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml(&contents)?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string without touching the environment
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| anyhow!("Invalid configuration: {}", e))
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(host) = env::var("HTTP_HOST") {
            self.service.http_host = host;
        }
        if let Ok(port) = env::var("HTTP_PORT") {
            self.service.http_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HTTP_PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            self.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Store settings
        if let Ok(seed_file) = env::var("SEED_FILE") {
            self.store.seed_file = Some(PathBuf::from(seed_file));
        }
        if let Ok(rating) = env::var("INITIAL_RATING") {
            self.store.initial_rating = rating
                .parse()
                .map_err(|_| anyhow!("Invalid INITIAL_RATING value: {}", rating))?;
        }

        // Voting settings
        if let Ok(attempts) = env::var("PAIR_RETRY_ATTEMPTS") {
            self.voting.pair_retry_attempts = attempts
                .parse()
                .map_err(|_| anyhow!("Invalid PAIR_RETRY_ATTEMPTS value: {}", attempts))?;
        }
        if let Ok(delay) = env::var("SETTLE_DELAY_MS") {
            self.voting.settle_delay_ms = delay
                .parse()
                .map_err(|_| anyhow!("Invalid SETTLE_DELAY_MS value: {}", delay))?;
        }

        Ok(())
    }

        pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Get the vote settle delay as Duration
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.voting.settle_delay_ms)
    }
}

/// Reject configurations the service cannot run with
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate ports
    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }
    if config.service.http_host.is_empty() {
        return Err(anyhow!("HTTP host cannot be empty"));
    }

    // Validate timeouts
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }

    // Validate store settings
    if !config.store.initial_rating.is_finite() {
        return Err(anyhow!("Initial rating must be a finite number"));
    }

    // Validate voting settings
    if config.voting.pair_retry_attempts == 0 {
        return Err(anyhow!("Pair retry attempts must be at least 1"));
    }

    Ok(())
}
