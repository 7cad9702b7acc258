//! Configuration management for the clash-compare service
//!
//! This module handles configuration loading from TOML files and environment
//! variables, validation, default values, and the category storage mapping.

pub mod app;
pub mod category;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings, StoreSettings, VotingSettings};
pub use category::{CategoryTable, CategoryTables, DEFAULT_CATEGORY_TABLES};
