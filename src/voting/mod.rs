//! Voting flow
//!
//! Pair selection, the voter-facing session that predicts rating changes
//! optimistically, and the submission channel that records votes.

pub mod pairing;
pub mod session;
pub mod submission;

pub use pairing::{same_pair, ItemPair, PairSelector};
pub use session::{submit_in_background, Ballot, Choice, VoteSession, VoteSubmitter};
pub use submission::VoteService;
