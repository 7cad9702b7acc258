//! Common types used throughout the voting service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a rated card or emote
pub type ItemId = i64;

/// Unique identifier for a recorded vote
pub type VoteId = Uuid;

/// Rating every seeded item starts with
pub const INITIAL_RATING: f64 = 1000.0;

/// Kind of item being compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cards,
    Emotes,
}

impl Category {
    /// All categories, in display order
    pub const ALL: [Category; 2] = [Category::Cards, Category::Emotes];

    /// Path segment used by the API ("cards" / "emotes")
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cards => "cards",
            Category::Emotes => "emotes",
        }
    }

    /// Singular noun for user-facing messages
    pub fn noun(&self) -> &'static str {
        match self {
            Category::Cards => "Card",
            Category::Emotes => "Emote",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = crate::error::ClashCompareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cards" => Ok(Category::Cards),
            "emotes" => Ok(Category::Emotes),
            other => Err(crate::error::ClashCompareError::InvalidVote {
                reason: format!("unknown category '{}'", other),
            }),
        }
    }
}

/// How a single item fared in one comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemResult {
    Win,
    Loss,
    Draw,
}

/// A card or emote with its Elo rating and vote counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedItem {
    pub id: ItemId,
    pub category: Category,
    pub name: String,
    pub image_url: String,
    /// Only cards carry an elixir cost
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elixir_cost: Option<u32>,
    pub rating: f64,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
    pub created_at: DateTime<Utc>,
}

impl RatedItem {
    /// Create a fresh item at the initial rating with zeroed counters
    pub fn new(id: ItemId, category: Category, name: impl Into<String>) -> Self {
        Self {
            id,
            category,
            name: name.into(),
            image_url: String::new(),
            elixir_cost: None,
            rating: INITIAL_RATING,
            wins: 0,
            losses: 0,
            draws: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    pub fn with_elixir_cost(mut self, elixir_cost: Option<u32>) -> Self {
        self.elixir_cost = elixir_cost;
        self
    }

    /// Apply a rating delta and bump the counter matching `result`
    pub fn apply_result(&mut self, delta: f64, result: ItemResult) {
        self.rating = crate::rating::elo::apply_delta(self.rating, delta);
        match result {
            ItemResult::Win => self.wins += 1,
            ItemResult::Loss => self.losses += 1,
            ItemResult::Draw => self.draws += 1,
        }
    }

    pub fn total_votes(&self) -> u64 {
        self.wins + self.losses + self.draws
    }

    /// Share of comparisons won, in percent (0.0 when never voted on)
    pub fn win_rate(&self) -> f64 {
        let total = self.total_votes();
        if total == 0 {
            0.0
        } else {
            self.wins as f64 / total as f64 * 100.0
        }
    }
}

/// One pairwise comparison between two items.
///
/// For a draw both ids are still recorded; the winner slot simply holds the
/// first item of the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub winner_item_id: ItemId,
    pub loser_item_id: ItemId,
    pub is_draw: bool,
}

impl Outcome {
    pub fn decisive(winner_item_id: ItemId, loser_item_id: ItemId) -> Self {
        Self {
            winner_item_id,
            loser_item_id,
            is_draw: false,
        }
    }

    pub fn draw(first: ItemId, second: ItemId) -> Self {
        Self {
            winner_item_id: first,
            loser_item_id: second,
            is_draw: true,
        }
    }

    /// Result recorded against the winner slot and the loser slot
    pub fn results(&self) -> (ItemResult, ItemResult) {
        if self.is_draw {
            (ItemResult::Draw, ItemResult::Draw)
        } else {
            (ItemResult::Win, ItemResult::Loss)
        }
    }
}

/// Rating adjustment for one participant of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingDelta {
    pub item_id: ItemId,
    pub delta: f64,
}

/// Payload accepted by the vote submission channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteSubmission {
    pub winner_id: ItemId,
    pub loser_id: ItemId,
    #[serde(default)]
    pub is_draw: bool,
    pub category: Category,
}

impl VoteSubmission {
    pub fn outcome(&self) -> Outcome {
        Outcome {
            winner_item_id: self.winner_id,
            loser_item_id: self.loser_id,
            is_draw: self.is_draw,
        }
    }
}

/// Persisted vote row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub id: VoteId,
    pub winner_id: ItemId,
    pub loser_id: ItemId,
    pub is_draw: bool,
    /// Storage-side entity type ("card" / "emote")
    pub entity_type: String,
    pub created_at: DateTime<Utc>,
}

impl VoteRecord {
    pub fn outcome(&self) -> Outcome {
        Outcome {
            winner_item_id: self.winner_id,
            loser_item_id: self.loser_id,
            is_draw: self.is_draw,
        }
    }
}

/// Response of the submission channel once a vote has been recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub success: bool,
    /// Authoritative rating of the winner slot, if it could be read back
    pub winner_rating: Option<f64>,
    /// Authoritative rating of the loser slot, if it could be read back
    pub loser_rating: Option<f64>,
}
