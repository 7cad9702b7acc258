//! Elo rating engine
//!
//! The single implementation of the rating update used by both the optimistic
//! client-side prediction and the authoritative store. Both paths call into
//! these functions, so the constants below are the only place the formula is
//! parameterised.

use crate::types::{ItemId, Outcome, RatingDelta};
use serde::{Deserialize, Serialize};

/// Fixed K-factor scaling every rating adjustment
pub const K_FACTOR: f64 = 32.0;

/// Rating gap at which the favourite is expected to score ~0.91
pub const SCALE: f64 = 400.0;

/// Bumped whenever the formula or its constants change
pub const ENGINE_VERSION: u32 = 1;

/// Outcome of one comparison from the point of view of slot A
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    AWins,
    BWins,
    Draw,
}

impl MatchOutcome {
    /// Outcome with A and B swapped
    pub fn swapped(self) -> Self {
        match self {
            MatchOutcome::AWins => MatchOutcome::BWins,
            MatchOutcome::BWins => MatchOutcome::AWins,
            MatchOutcome::Draw => MatchOutcome::Draw,
        }
    }

    /// Label used for metrics and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOutcome::AWins => "a_wins",
            MatchOutcome::BWins => "b_wins",
            MatchOutcome::Draw => "draw",
        }
    }
}

impl std::str::FromStr for MatchOutcome {
    type Err = crate::error::ClashCompareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a_wins" | "a-wins" | "a" => Ok(MatchOutcome::AWins),
            "b_wins" | "b-wins" | "b" => Ok(MatchOutcome::BWins),
            "draw" => Ok(MatchOutcome::Draw),
            other => Err(crate::error::ClashCompareError::InvalidVote {
                reason: format!("unknown outcome '{}'", other),
            }),
        }
    }
}

/// Expected score of `rating_self` against `rating_opponent`
pub fn expected_score(rating_self: f64, rating_opponent: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_opponent - rating_self) / SCALE))
}

/// Rating change for one side: a win when `is_draw` is false, a draw otherwise
pub fn rating_change(own_rating: f64, opponent_rating: f64, is_draw: bool) -> f64 {
    let expected = expected_score(own_rating, opponent_rating);
    if is_draw {
        K_FACTOR * (0.5 - expected)
    } else {
        K_FACTOR * (1.0 - expected)
    }
}

/// Deltas for slot A and slot B after `outcome`.
///
/// Decisive deltas are exact negations of each other. Draw deltas are computed
/// independently per side; since `expected(b, a) == 1 - expected(a, b)` they
/// still cancel up to rounding.
pub fn compute_deltas(rating_a: f64, rating_b: f64, outcome: MatchOutcome) -> (f64, f64) {
    match outcome {
        MatchOutcome::AWins => {
            let delta_a = rating_change(rating_a, rating_b, false);
            (delta_a, -delta_a)
        }
        MatchOutcome::BWins => {
            let delta_b = rating_change(rating_b, rating_a, false);
            (-delta_b, delta_b)
        }
        MatchOutcome::Draw => (
            rating_change(rating_a, rating_b, true),
            rating_change(rating_b, rating_a, true),
        ),
    }
}

/// Deltas for a recorded outcome, winner slot first
pub fn deltas_for(outcome: &Outcome, winner_rating: f64, loser_rating: f64) -> [RatingDelta; 2] {
    let kind = if outcome.is_draw {
        MatchOutcome::Draw
    } else {
        MatchOutcome::AWins
    };
    let (winner_delta, loser_delta) = compute_deltas(winner_rating, loser_rating, kind);

    [
        RatingDelta {
            item_id: outcome.winner_item_id,
            delta: winner_delta,
        },
        RatingDelta {
            item_id: outcome.loser_item_id,
            delta: loser_delta,
        },
    ]
}

/// New rating after a delta; never clamped
pub fn apply_delta(rating: f64, delta: f64) -> f64 {
    rating + delta
}

/// Predicted rating movement of one participant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedRating {
    pub item_id: ItemId,
    pub old_rating: f64,
    pub delta: f64,
    pub new_rating: f64,
}

/// Rating movement of both participants of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub outcome: MatchOutcome,
    pub first: PredictedRating,
    pub second: PredictedRating,
    pub engine_version: u32,
}

impl Prediction {
    /// Predict the result of `outcome` between `first` and `second`, each
    /// given as `(id, current rating)`
    pub fn new(first: (ItemId, f64), second: (ItemId, f64), outcome: MatchOutcome) -> Self {
        let (delta_first, delta_second) = compute_deltas(first.1, second.1, outcome);

        Self {
            outcome,
            first: PredictedRating {
                item_id: first.0,
                old_rating: first.1,
                delta: delta_first,
                new_rating: apply_delta(first.1, delta_first),
            },
            second: PredictedRating {
                item_id: second.0,
                old_rating: second.1,
                delta: delta_second,
                new_rating: apply_delta(second.1, delta_second),
            },
            engine_version: ENGINE_VERSION,
        }
    }
}
