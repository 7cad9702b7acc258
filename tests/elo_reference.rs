//! Cross-checks the rating engine against the skillratings Elo implementation

use clash_compare::rating::{compute_deltas, MatchOutcome, K_FACTOR};
use skillratings::elo::{elo, EloConfig, EloRating};
use skillratings::Outcomes;

const TOLERANCE: f64 = 1e-9;

fn reference(rating_a: f64, rating_b: f64, outcome: MatchOutcome) -> (f64, f64) {
    let config = EloConfig { k: K_FACTOR };
    let result = match outcome {
        MatchOutcome::AWins => Outcomes::WIN,
        MatchOutcome::BWins => Outcomes::LOSS,
        MatchOutcome::Draw => Outcomes::DRAW,
    };

    let (new_a, new_b) = elo(
        &EloRating { rating: rating_a },
        &EloRating { rating: rating_b },
        &result,
        &config,
    );
    (new_a.rating - rating_a, new_b.rating - rating_b)
}

#[test]
fn test_matches_reference_elo() {
    let ratings = [
        (1000.0, 1000.0),
        (1200.0, 1000.0),
        (1000.0, 1200.0),
        (1350.25, 812.5),
        (640.0, 1480.0),
        (1000.0, 1001.0),
        (-200.0, 300.0),
    ];

    for (a, b) in ratings {
        for outcome in [MatchOutcome::AWins, MatchOutcome::BWins, MatchOutcome::Draw] {
            let (delta_a, delta_b) = compute_deltas(a, b, outcome);
            let (expected_a, expected_b) = reference(a, b, outcome);

            assert!(
                (delta_a - expected_a).abs() < TOLERANCE,
                "{} vs {} ({:?}): {} != {}",
                a,
                b,
                outcome,
                delta_a,
                expected_a
            );
            assert!(
                (delta_b - expected_b).abs() < TOLERANCE,
                "{} vs {} ({:?}): {} != {}",
                a,
                b,
                outcome,
                delta_b,
                expected_b
            );
        }
    }

    println!("✅ Engine agrees with reference Elo on {} pairings", ratings.len() * 3);
}
