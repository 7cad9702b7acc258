//! Utility functions for the voting service

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique vote ID
pub fn generate_vote_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Round half up to the nearest whole rating point
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Format a rating for display as a whole number
pub fn format_rating(rating: f64) -> String {
    format!("{}", round_half_up(rating))
}

/// Format a rating change with an explicit sign ("+16", "-8", "0")
pub fn format_delta(delta: f64) -> String {
    let rounded = round_half_up(delta);
    if rounded > 0.0 {
        format!("+{}", rounded)
    } else if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{}", rounded)
    }
}
