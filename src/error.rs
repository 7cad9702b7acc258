//! Error types for the voting service
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

use crate::types::{Category, ItemId};

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific voting scenarios
#[derive(Debug, thiserror::Error)]
pub enum ClashCompareError {
    #[error("Invalid vote data: {reason}")]
    InvalidVote { reason: String },

    #[error("Item {item_id} not found in {category}")]
    ItemNotFound { category: Category, item_id: ItemId },

    #[error("Not enough {category} to vote on: {available} available")]
    NotEnoughItems { category: Category, available: usize },

    #[error("A decision has already been made for this pair")]
    AlreadyDecided,

    #[error("No pair is currently being voted on")]
    NoActivePair,

    #[error("Item store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Seed catalog error: {message}")]
    SeedError { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl ClashCompareError {
    /// Short label used for metrics
    pub fn reason_label(&self) -> &'static str {
        match self {
            ClashCompareError::InvalidVote { .. } => "invalid",
            ClashCompareError::ItemNotFound { .. } => "not_found",
            ClashCompareError::NotEnoughItems { .. } => "not_enough_items",
            ClashCompareError::AlreadyDecided => "already_decided",
            ClashCompareError::NoActivePair => "no_active_pair",
            ClashCompareError::StoreUnavailable { .. } => "store_unavailable",
            ClashCompareError::SeedError { .. } => "seed",
            ClashCompareError::ConfigurationError { .. } => "configuration",
            ClashCompareError::InternalError { .. } => "internal",
        }
    }
}
