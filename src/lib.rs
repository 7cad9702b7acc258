//! Clash Compare - pairwise voting and Elo ranking for Clash Royale cards and emotes
//!
//! Voters are shown two items and pick the better one (or call it a draw).
//! Every vote adjusts both items' Elo ratings with a single shared engine,
//! used both for the instant client-side prediction and for the
//! authoritative update in the item store. Ratings map onto coarse tiers for
//! the leaderboards.

pub mod api;
pub mod config;
pub mod error;
pub mod leaderboard;
pub mod metrics;
pub mod rating;
pub mod service;
pub mod store;
pub mod types;
pub mod utils;
pub mod voting;

// Re-export commonly used types and traits
pub use error::{ClashCompareError, Result};
pub use types::*;

// Re-export key components
pub use rating::{compute_deltas, expected_score, MatchOutcome, Prediction, Tier};
pub use store::{InMemoryItemStore, ItemStore};
pub use voting::{VoteService, VoteSession, VoteSubmitter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
