//! Vote submission channel
//!
//! Server side of voting: validates a submission, records it in the item
//! store (which applies the authoritative rating update), waits for the
//! update to settle, and reads both ratings back for the caller.

use crate::config::CategoryTables;
use crate::error::ClashCompareError;
use crate::metrics::MetricsCollector;
use crate::rating::MatchOutcome;
use crate::store::ItemStore;
use crate::types::{Category, ItemId, RatedItem, VoteReceipt, VoteRecord, VoteSubmission};
use crate::utils::{current_timestamp, generate_vote_id};
use crate::voting::pairing::{ItemPair, PairSelector};
use crate::voting::session::VoteSubmitter;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default pause between recording a vote and reading the ratings back
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Records votes and serves pairs against an item store
#[derive(Clone)]
pub struct VoteService {
    store: Arc<dyn ItemStore>,
    tables: CategoryTables,
    selector: PairSelector,
    settle_delay: Duration,
    metrics: Option<Arc<MetricsCollector>>,
}

impl VoteService {
    pub fn new(store: Arc<dyn ItemStore>, tables: CategoryTables) -> Self {
        Self {
            store,
            tables,
            selector: PairSelector::default(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            metrics: None,
        }
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn with_pair_selector(mut self, selector: PairSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn store(&self) -> Arc<dyn ItemStore> {
        self.store.clone()
    }

    /// Reject submissions that can never be recorded
    pub fn validate(submission: &VoteSubmission) -> crate::error::Result<()> {
        if submission.winner_id == submission.loser_id {
            return Err(ClashCompareError::InvalidVote {
                reason: "winner and loser must be different items".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Record a vote and report the ratings after the update.
    ///
    /// The vote counts once the store has accepted it. If reading the ratings
    /// back fails, the receipt still reports success with no ratings.
    pub async fn submit(&self, submission: VoteSubmission) -> crate::error::Result<VoteReceipt> {
        let started = std::time::Instant::now();
        let category = submission.category;

        if let Err(e) = Self::validate(&submission) {
            self.record_error(category, &e);
            return Err(e);
        }

        let vote = VoteRecord {
            id: generate_vote_id(),
            winner_id: submission.winner_id,
            loser_id: submission.loser_id,
            is_draw: submission.is_draw,
            entity_type: self.tables.entity_type(category).to_string(),
            created_at: current_timestamp(),
        };
        let vote_id = vote.id;

        let store_started = std::time::Instant::now();
        let deltas = match self.store.record_vote(category, vote).await {
            Ok(deltas) => deltas,
            Err(e) => {
                warn!(
                    "Failed to record {} vote {} vs {}: {}",
                    category, submission.winner_id, submission.loser_id, e
                );
                self.record_error(category, &e);
                return Err(e);
            }
        };
        if let Some(metrics) = &self.metrics {
            metrics.record_store_operation("record_vote", store_started.elapsed());
        }

        debug!(
            "Vote {} recorded: {} {:+.3}, {} {:+.3}",
            vote_id, deltas[0].item_id, deltas[0].delta, deltas[1].item_id, deltas[1].delta
        );

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        let receipt = match self
            .read_back(category, submission.winner_id, submission.loser_id)
            .await
        {
            Ok((winner_rating, loser_rating)) => VoteReceipt {
                success: true,
                winner_rating: Some(winner_rating),
                loser_rating: Some(loser_rating),
            },
            Err(e) => {
                warn!("Vote {} recorded but ratings could not be read back: {}", vote_id, e);
                VoteReceipt {
                    success: true,
                    winner_rating: None,
                    loser_rating: None,
                }
            }
        };

        if let Some(metrics) = &self.metrics {
            let outcome = if submission.is_draw {
                MatchOutcome::Draw
            } else {
                MatchOutcome::AWins
            };
            let ratings: Vec<f64> = [receipt.winner_rating, receipt.loser_rating]
                .into_iter()
                .flatten()
                .collect();
            metrics.record_vote(category, outcome, &ratings, started.elapsed());
        }

        info!(
            "Recorded {} vote {} (winner: {}, loser: {}, draw: {})",
            category, vote_id, submission.winner_id, submission.loser_id, submission.is_draw
        );

        Ok(receipt)
    }

    /// Draw the next pair to vote on, with full item details
    pub async fn next_pair(
        &self,
        category: Category,
        previous: Option<ItemPair>,
    ) -> crate::error::Result<(RatedItem, RatedItem)> {
        let ids = self.store.list_ids(category).await?;

        // ThreadRng is not Send; keep it out of the await points
        let (first_id, second_id) = {
            let mut rng = rand::rng();
            self.selector.select(category, &ids, previous, &mut rng)?
        };

        let first = self.fetch(category, first_id).await?;
        let second = self.fetch(category, second_id).await?;

        if let Some(metrics) = &self.metrics {
            metrics.record_pair_served(category);
        }
        debug!("Serving {} pair {} vs {}", category, first_id, second_id);

        Ok((first, second))
    }

    async fn fetch(&self, category: Category, item_id: ItemId) -> crate::error::Result<RatedItem> {
        self.store
            .get_item(category, item_id)
            .await?
            .ok_or_else(|| ClashCompareError::ItemNotFound { category, item_id }.into())
    }

    async fn read_back(
        &self,
        category: Category,
        winner_id: ItemId,
        loser_id: ItemId,
    ) -> crate::error::Result<(f64, f64)> {
        let winner = self.fetch(category, winner_id).await?;
        let loser = self.fetch(category, loser_id).await?;
        Ok((winner.rating, loser.rating))
    }

    fn record_error(&self, category: Category, error: &anyhow::Error) {
        if let Some(metrics) = &self.metrics {
            let reason = error
                .downcast_ref::<ClashCompareError>()
                .map(|e| e.reason_label())
                .unwrap_or("internal");
            metrics.record_vote_error(category, reason);
        }
    }
}

#[async_trait]
impl VoteSubmitter for VoteService {
    async fn submit(&self, submission: VoteSubmission) -> crate::error::Result<VoteReceipt> {
        VoteService::submit(self, submission).await
    }
}
