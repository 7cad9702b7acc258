//! Elo rating engine and tier classification
//!
//! This module holds the pure rating math shared by the optimistic prediction
//! path and the authoritative store.

pub mod elo;
pub mod tier;

// Re-export commonly used types
pub use elo::{compute_deltas, expected_score, MatchOutcome, Prediction, K_FACTOR};
pub use tier::Tier;
