//! Coarse tier labels derived from a rating

use serde::{Deserialize, Serialize};

/// Ordinal tier, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "S+")]
    SPlus,
    S,
    A,
    B,
    C,
    D,
    F,
}

/// Lower bounds, checked top to bottom; anything below the last is `F`
const THRESHOLDS: [(f64, Tier); 6] = [
    (1300.0, Tier::SPlus),
    (1200.0, Tier::S),
    (1100.0, Tier::A),
    (1000.0, Tier::B),
    (900.0, Tier::C),
    (800.0, Tier::D),
];

impl Tier {
    /// Classify a rating. Total over every `f64`; NaN lands in `F`.
    pub fn from_rating(rating: f64) -> Self {
        THRESHOLDS
            .iter()
            .find(|(min, _)| rating >= *min)
            .map(|(_, tier)| *tier)
            .unwrap_or(Tier::F)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::SPlus => "S+",
            Tier::S => "S",
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
            Tier::D => "D",
            Tier::F => "F",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(Tier::from_rating(1300.0), Tier::SPlus);
        assert_eq!(Tier::from_rating(1299.999), Tier::S);
        assert_eq!(Tier::from_rating(1200.0), Tier::S);
        assert_eq!(Tier::from_rating(1100.0), Tier::A);
        assert_eq!(Tier::from_rating(1000.0), Tier::B);
        assert_eq!(Tier::from_rating(999.99), Tier::C);
        assert_eq!(Tier::from_rating(800.0), Tier::D);
        assert_eq!(Tier::from_rating(799.0), Tier::F);
    }

    #[test]
    fn test_out_of_range_ratings() {
        assert_eq!(Tier::from_rating(-50.0), Tier::F);
        assert_eq!(Tier::from_rating(1.0e9), Tier::SPlus);
        assert_eq!(Tier::from_rating(f64::NEG_INFINITY), Tier::F);
        assert_eq!(Tier::from_rating(f64::NAN), Tier::F);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Tier::SPlus.to_string(), "S+");
        assert_eq!(serde_json::to_string(&Tier::SPlus).unwrap(), "\"S+\"");
        assert_eq!(serde_json::to_string(&Tier::B).unwrap(), "\"B\"");
        assert!(Tier::SPlus < Tier::F);
    }
}
