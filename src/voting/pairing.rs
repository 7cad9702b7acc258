//! Random pair selection
//!
//! Pairs are drawn by shuffling the candidate ids and taking the first two.
//! If the draw repeats the pair that was just shown, the ids are reshuffled a
//! bounded number of times; after that the repeat is accepted. Avoiding
//! repeats is best effort only.

use crate::error::ClashCompareError;
use crate::types::{Category, ItemId};
use rand::seq::SliceRandom;
use rand::Rng;

/// Two item ids shown side by side
pub type ItemPair = (ItemId, ItemId);

/// Default number of reshuffles when a draw repeats the previous pair
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 10;

/// Whether two pairs hold the same ids in either order
pub fn same_pair(a: ItemPair, b: ItemPair) -> bool {
    (a.0 == b.0 && a.1 == b.1) || (a.0 == b.1 && a.1 == b.0)
}

/// Bounded-retry random pair selector
#[derive(Debug, Clone, Copy)]
pub struct PairSelector {
    max_attempts: u32,
}

impl PairSelector {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pick two distinct ids from `ids`, trying to avoid `previous`
    pub fn select<R: Rng + ?Sized>(
        &self,
        category: Category,
        ids: &[ItemId],
        previous: Option<ItemPair>,
        rng: &mut R,
    ) -> crate::error::Result<ItemPair> {
        let mut pool = ids.to_vec();
        pool.sort_unstable();
        pool.dedup();

        if pool.len() < 2 {
            return Err(ClashCompareError::NotEnoughItems {
                category,
                available: pool.len(),
            }
            .into());
        }

        let mut pair = draw(&mut pool, rng);

        if let Some(previous) = previous {
            let mut attempts = 0;
            while same_pair(pair, previous) && attempts < self.max_attempts {
                pair = draw(&mut pool, rng);
                attempts += 1;
            }
        }

        Ok(pair)
    }
}

impl Default for PairSelector {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_ATTEMPTS)
    }
}

fn draw<R: Rng + ?Sized>(pool: &mut [ItemId], rng: &mut R) -> ItemPair {
    pool.shuffle(rng);
    (pool[0], pool[1])
}
