//! Service layer for the clash-compare voting service
//!
//! This module contains the main application state, health checks and
//! background task management for the production service.

pub mod app;
pub mod health;

pub use app::{AppState, ServiceError};
pub use health::{ComponentCheck, HealthCheck, HealthStatus, ServiceStats};
