//! Item store interface
//!
//! The hosted database is an external collaborator. This trait captures the
//! queries the voting flow needs from it and the vote-recording write that
//! triggers the authoritative rating update.

use crate::types::{Category, ItemId, RatedItem, RatingDelta, VoteRecord};
use async_trait::async_trait;

/// Trait for rated item storage operations
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Ids of every item in a category
    async fn list_ids(&self, category: Category) -> crate::error::Result<Vec<ItemId>>;

    /// Fetch a single item
    async fn get_item(
        &self,
        category: Category,
        item_id: ItemId,
    ) -> crate::error::Result<Option<RatedItem>>;

    /// Number of items whose rating is strictly greater than `rating`
    async fn count_rated_above(&self, category: Category, rating: f64)
        -> crate::error::Result<usize>;

    /// Every item in a category, highest rating first
    async fn list_by_rating(&self, category: Category) -> crate::error::Result<Vec<RatedItem>>;

    /// Total number of items in a category
    async fn item_count(&self, category: Category) -> crate::error::Result<usize>;

    /// Persist a vote and apply its rating update, returning the applied
    /// deltas (winner slot first)
    async fn record_vote(
        &self,
        category: Category,
        vote: VoteRecord,
    ) -> crate::error::Result<[RatingDelta; 2]>;
}

/// Competition rank of an item: one more than the number of strictly better
/// rated items
pub async fn rank_of(
    store: &dyn ItemStore,
    category: Category,
    item: &RatedItem,
) -> crate::error::Result<usize> {
    Ok(store.count_rated_above(category, item.rating).await? + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryItemStore;
    use tokio_test::{assert_ok, block_on};

    #[test]
    fn test_rank_counts_ties_once() {
        let store = InMemoryItemStore::default();
        assert_ok!(store.insert_items(vec![
            RatedItem::new(0, Category::Cards, "Knight").with_rating(1100.0),
            RatedItem::new(1, Category::Cards, "Archers").with_rating(1050.0),
            RatedItem::new(2, Category::Cards, "Goblins").with_rating(1050.0),
            RatedItem::new(3, Category::Cards, "Skeletons").with_rating(900.0),
        ]));

        let items = assert_ok!(block_on(store.list_by_rating(Category::Cards)));
        let ranks: Vec<usize> = items
            .iter()
            .map(|item| assert_ok!(block_on(rank_of(&store, Category::Cards, item))))
            .collect();

        assert_eq!(ranks, vec![1, 2, 2, 4]);
    }
}
