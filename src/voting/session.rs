//! Client-side voting session
//!
//! A session shows one pair at a time. When the voter decides, the new ratings
//! are predicted locally with the shared engine and shown immediately; the vote
//! itself is sent to the submission channel without waiting for the result.

use crate::error::ClashCompareError;
use crate::rating::{MatchOutcome, Prediction};
use crate::types::{Category, ItemId, ItemResult, RatedItem, VoteReceipt, VoteSubmission};
use crate::voting::pairing::ItemPair;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Anything that accepts vote submissions
#[async_trait]
pub trait VoteSubmitter: Send + Sync {
    async fn submit(&self, submission: VoteSubmission) -> crate::error::Result<VoteReceipt>;
}

/// The voter's decision for the current pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    First,
    Second,
    Draw,
}

impl Choice {
    fn outcome(self) -> MatchOutcome {
        match self {
            Choice::First => MatchOutcome::AWins,
            Choice::Second => MatchOutcome::BWins,
            Choice::Draw => MatchOutcome::Draw,
        }
    }

    fn results(self) -> (ItemResult, ItemResult) {
        match self {
            Choice::First => (ItemResult::Win, ItemResult::Loss),
            Choice::Second => (ItemResult::Loss, ItemResult::Win),
            Choice::Draw => (ItemResult::Draw, ItemResult::Draw),
        }
    }
}

/// Outcome of a decision: what to show now and what to send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    pub prediction: Prediction,
    pub submission: VoteSubmission,
}

/// One voter's view of the current pair
#[derive(Debug, Clone)]
pub struct VoteSession {
    category: Category,
    pair: Option<(RatedItem, RatedItem)>,
    decided: bool,
}

impl VoteSession {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            pair: None,
            decided: false,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Show a new pair; any previous decision is forgotten
    pub fn present(&mut self, first: RatedItem, second: RatedItem) {
        self.pair = Some((first, second));
        self.decided = false;
    }

    /// Items currently shown, with any optimistic updates applied
    pub fn current_pair(&self) -> Option<(&RatedItem, &RatedItem)> {
        self.pair.as_ref().map(|(first, second)| (first, second))
    }

    /// Ids of the pair currently shown, for repeat avoidance
    pub fn current_ids(&self) -> Option<ItemPair> {
        self.pair.as_ref().map(|(first, second)| (first.id, second.id))
    }

    pub fn is_decided(&self) -> bool {
        self.decided
    }

    /// Decide the current pair.
    ///
    /// Predicts both new ratings, applies them (and the counters) to the local
    /// copies, and returns the submission to send. A draw sends the first item
    /// as `winner_id`.
    pub fn choose(&mut self, choice: Choice) -> crate::error::Result<Ballot> {
        if self.decided {
            return Err(ClashCompareError::AlreadyDecided.into());
        }
        let (first, second) = self.pair.as_mut().ok_or(ClashCompareError::NoActivePair)?;

        let prediction = Prediction::new(
            (first.id, first.rating),
            (second.id, second.rating),
            choice.outcome(),
        );

        let (first_result, second_result) = choice.results();
        first.apply_result(prediction.first.delta, first_result);
        second.apply_result(prediction.second.delta, second_result);

        let (winner_id, loser_id): (ItemId, ItemId) = match choice {
            Choice::First | Choice::Draw => (first.id, second.id),
            Choice::Second => (second.id, first.id),
        };

        self.decided = true;

        debug!(
            "Predicted {} vote: {} -> {:.2}, {} -> {:.2}",
            choice.outcome().as_str(),
            prediction.first.item_id,
            prediction.first.new_rating,
            prediction.second.item_id,
            prediction.second.new_rating
        );

        Ok(Ballot {
            prediction,
            submission: VoteSubmission {
                winner_id,
                loser_id,
                is_draw: choice == Choice::Draw,
                category: self.category,
            },
        })
    }

    /// Move on without voting
    pub fn skip(&mut self) -> crate::error::Result<()> {
        if self.pair.is_none() {
            return Err(ClashCompareError::NoActivePair.into());
        }
        if self.decided {
            return Err(ClashCompareError::AlreadyDecided.into());
        }
        self.decided = true;
        Ok(())
    }
}

/// Send a submission without waiting for it; failures are only logged
pub fn submit_in_background(
    submitter: Arc<dyn VoteSubmitter>,
    submission: VoteSubmission,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = submitter.submit(submission.clone()).await {
            warn!(
                "Background vote submission failed - category: {}, winner: {}, loser: {}, error: {}",
                submission.category, submission.winner_id, submission.loser_id, e
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn session_with_pair(first_rating: f64, second_rating: f64) -> VoteSession {
        let mut session = VoteSession::new(Category::Cards);
        session.present(
            RatedItem::new(1, Category::Cards, "Mega Knight").with_rating(first_rating),
            RatedItem::new(2, Category::Cards, "Elixir Golem").with_rating(second_rating),
        );
        session
    }

    #[derive(Default)]
    struct RecordingSubmitter {
        submissions: Mutex<Vec<VoteSubmission>>,
        fail: bool,
    }

    #[async_trait]
    impl VoteSubmitter for RecordingSubmitter {
        async fn submit(&self, submission: VoteSubmission) -> crate::error::Result<VoteReceipt> {
            if let Ok(mut submissions) = self.submissions.lock() {
                submissions.push(submission);
            }
            if self.fail {
                return Err(ClashCompareError::StoreUnavailable {
                    message: "offline".to_string(),
                }
                .into());
            }
            Ok(VoteReceipt {
                success: true,
                winner_rating: None,
                loser_rating: None,
            })
        }
    }

    #[test]
    fn test_first_wins() {
        let mut session = session_with_pair(1000.0, 1000.0);
        let ballot = session.choose(Choice::First).unwrap();

        assert_eq!(ballot.prediction.first.delta, 16.0);
        assert_eq!(ballot.prediction.second.delta, -16.0);
        assert_eq!(ballot.submission.winner_id, 1);
        assert_eq!(ballot.submission.loser_id, 2);
        assert!(!ballot.submission.is_draw);

        let (first, second) = session.current_pair().unwrap();
        assert_eq!(first.rating, 1016.0);
        assert_eq!(second.rating, 984.0);
        assert_eq!(first.wins, 1);
        assert_eq!(second.losses, 1);
    }

    #[test]
    fn test_second_wins() {
        let mut session = session_with_pair(1200.0, 1000.0);
        let ballot = session.choose(Choice::Second).unwrap();

        assert_eq!(ballot.submission.winner_id, 2);
        assert_eq!(ballot.submission.loser_id, 1);
        assert!(ballot.prediction.second.delta > 16.0);
        assert_eq!(ballot.prediction.first.delta, -ballot.prediction.second.delta);

        let (first, second) = session.current_pair().unwrap();
        assert_eq!(first.losses, 1);
        assert_eq!(second.wins, 1);
    }

    #[test]
    fn test_draw_keeps_pair_order() {
        let mut session = session_with_pair(1200.0, 1000.0);
        let ballot = session.choose(Choice::Draw).unwrap();

        assert!(ballot.submission.is_draw);
        assert_eq!(ballot.submission.winner_id, 1);
        assert_eq!(ballot.submission.loser_id, 2);
        assert!(ballot.prediction.first.delta < 0.0);
        assert!(ballot.prediction.second.delta > 0.0);

        let (first, second) = session.current_pair().unwrap();
        assert_eq!(first.draws, 1);
        assert_eq!(second.draws, 1);
    }

    #[test]
    fn test_one_decision_per_pair() {
        let mut session = session_with_pair(1000.0, 1000.0);
        session.choose(Choice::First).unwrap();
        assert!(session.choose(Choice::Second).is_err());
        assert!(session.skip().is_err());

        session.present(
            RatedItem::new(3, Category::Cards, "Sparky"),
            RatedItem::new(4, Category::Cards, "X-Bow"),
        );
        assert!(!session.is_decided());
        assert_eq!(session.current_ids(), Some((3, 4)));
        assert!(session.skip().is_ok());
        assert!(session.choose(Choice::Draw).is_err());
    }

    #[test]
    fn test_no_pair() {
        let mut session = VoteSession::new(Category::Emotes);
        assert!(session.choose(Choice::First).is_err());
        assert!(session.skip().is_err());
        assert!(session.current_pair().is_none());
    }

    #[tokio::test]
    async fn test_background_submission() {
        let submitter = Arc::new(RecordingSubmitter::default());
        let mut session = session_with_pair(1000.0, 1000.0);
        let ballot = session.choose(Choice::First).unwrap();

        submit_in_background(submitter.clone(), ballot.submission.clone())
            .await
            .unwrap();

        let submissions = submitter.submissions.lock().unwrap();
        assert_eq!(submissions.as_slice(), &[ballot.submission]);
    }

    #[tokio::test]
    async fn test_background_failure_is_swallowed() {
        let submitter = Arc::new(RecordingSubmitter {
            fail: true,
            ..Default::default()
        });
        let mut session = session_with_pair(1000.0, 1000.0);
        let ballot = session.choose(Choice::Draw).unwrap();

        let handle = submit_in_background(submitter.clone(), ballot.submission);
        assert!(handle.await.is_ok());
        assert_eq!(submitter.submissions.lock().unwrap().len(), 1);
    }
}
