//! Vote Simulator CLI Tool
//!
//! Offline companion to the voting service: exercise the rating engine
//! directly, or cast random votes against an in-memory store.
//!
//! Usage:
//!   cargo run --bin vote-simulator -- --help
//!   cargo run --bin vote-simulator predict --rating-a 1200 --rating-b 1000 --outcome b_wins
//!   cargo run --bin vote-simulator tier --rating 1187.5
//!   cargo run --bin vote-simulator simulate --items 12 --votes 500 --seed 7

use anyhow::Result;
use clap::{Parser, Subcommand};
use clash_compare::config::DEFAULT_CATEGORY_TABLES;
use clash_compare::leaderboard;
use clash_compare::rating::{expected_score, MatchOutcome, Prediction, Tier};
use clash_compare::store::{seed_store, InMemoryItemStore, SeedCatalog};
use clash_compare::types::{Category, RatedItem, INITIAL_RATING};
use clash_compare::utils::{format_delta, format_rating};
use clash_compare::voting::{Choice, VoteService, VoteSession};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "vote-simulator")]
#[command(about = "Offline rating engine and voting simulator for clash-compare")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the rating change of one comparison
    Predict {
        /// Rating of participant A
        #[arg(short = 'a', long)]
        rating_a: f64,
        /// Rating of participant B
        #[arg(short = 'b', long)]
        rating_b: f64,
        /// Outcome (a_wins, b_wins, draw)
        #[arg(short, long, default_value = "a_wins")]
        outcome: String,
    },
    /// Show the tier of a rating
    Tier {
        #[arg(short, long)]
        rating: f64,
    },
    /// Cast random votes through the vote service and print the leaderboard
    Simulate {
        /// JSON seed catalog; synthetic items are generated when absent
        #[arg(long)]
        seed_file: Option<PathBuf>,
        /// Category to vote on (cards or emotes)
        #[arg(short, long, default_value = "cards")]
        category: String,
        /// Number of synthetic items when no catalog is given
        #[arg(short, long, default_value = "10")]
        items: usize,
        /// Number of votes to cast
        #[arg(short, long, default_value = "200")]
        votes: usize,
        /// Probability of a draw
        #[arg(long, default_value = "0.1")]
        draw_rate: f64,
        /// RNG seed for the voters' choices
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Leaderboard rows to print
        #[arg(long, default_value = "10")]
        top: usize,
    },
}

fn print_prediction(prediction: &Prediction) {
    for (label, side) in [("A", &prediction.first), ("B", &prediction.second)] {
        println!(
            "  {}: {} -> {} ({}) [{} -> {}]",
            label,
            format_rating(side.old_rating),
            format_rating(side.new_rating),
            format_delta(side.delta),
            Tier::from_rating(side.old_rating),
            Tier::from_rating(side.new_rating)
        );
    }
}

fn synthetic_items(category: Category, count: usize) -> Vec<RatedItem> {
    (0..count)
        .map(|i| RatedItem::new(i as i64, category, format!("{} {}", category.noun(), i + 1)))
        .collect()
}

async fn simulate(
    store: Arc<InMemoryItemStore>,
    category: Category,
    votes: usize,
    draw_rate: f64,
    seed: u64,
) -> Result<(usize, usize)> {
    let service = VoteService::new(store, DEFAULT_CATEGORY_TABLES).with_settle_delay(Duration::ZERO);
    let mut session = VoteSession::new(category);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut matched = 0;

    for _ in 0..votes {
        let (first, second) = service.next_pair(category, session.current_ids()).await?;
        session.present(first, second);

        let choice = if rng.random_bool(draw_rate) {
            Choice::Draw
        } else if rng.random_bool(0.5) {
            Choice::First
        } else {
            Choice::Second
        };

        let ballot = session.choose(choice)?;
        let receipt = service.submit(ballot.submission.clone()).await?;

        let (predicted_winner, predicted_loser) = match choice {
            Choice::First | Choice::Draw => (&ballot.prediction.first, &ballot.prediction.second),
            Choice::Second => (&ballot.prediction.second, &ballot.prediction.first),
        };
        let agrees = |predicted: f64, actual: Option<f64>| {
            actual.is_some_and(|actual| (predicted - actual).abs() < 1e-9)
        };
        if agrees(predicted_winner.new_rating, receipt.winner_rating)
            && agrees(predicted_loser.new_rating, receipt.loser_rating)
        {
            matched += 1;
        }
    }

    Ok((matched, votes))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Predict {
            rating_a,
            rating_b,
            outcome,
        } => {
            let outcome: MatchOutcome = outcome.parse()?;
            let prediction = Prediction::new((0, rating_a), (1, rating_b), outcome);

            println!(
                "🎲 Expected score for A: {:.4}",
                expected_score(rating_a, rating_b)
            );
            println!("📈 Outcome: {}", outcome.as_str());
            print_prediction(&prediction);
        }
        Commands::Tier { rating } => {
            println!("{} -> {}", format_rating(rating), Tier::from_rating(rating));
        }
        Commands::Simulate {
            seed_file,
            category,
            items,
            votes,
            draw_rate,
            seed,
            top,
        } => {
            let category: Category = category.parse()?;
            if !(0.0..=1.0).contains(&draw_rate) {
                anyhow::bail!("draw rate must be between 0 and 1");
            }

            let store = Arc::new(InMemoryItemStore::new(DEFAULT_CATEGORY_TABLES));
            match seed_file {
                Some(path) => {
                    let catalog = SeedCatalog::from_file(&path)?;
                    let summary = seed_store(&store, &catalog, INITIAL_RATING)?;
                    println!(
                        "📦 Loaded {} cards and {} emotes from {}",
                        summary.cards,
                        summary.emotes,
                        path.display()
                    );
                }
                None => {
                    store.insert_items(synthetic_items(category, items))?;
                    println!("📦 Generated {} synthetic {}", items, category);
                }
            }

            println!("🗳️  Casting {} votes on {}...", votes, category);
            let (matched, total) = simulate(store.clone(), category, votes, draw_rate, seed).await?;
            println!(
                "✅ Predictions matched authoritative ratings for {}/{} votes",
                matched, total
            );

            let rows = leaderboard::leaderboard(store.as_ref(), category, None).await?;
            println!("\n🏆 Top {} {}:", top.min(rows.len()), category);
            for row in rows.iter().take(top) {
                println!(
                    "  #{:<3} {:<3} {:>5}  {:<28} {:>4} votes  {:>5.1}% wins",
                    row.rank,
                    row.tier.label(),
                    format_rating(row.item.rating),
                    row.item.name,
                    row.total_votes,
                    row.win_rate
                );
            }
        }
    }

    Ok(())
}
