//! Leaderboard and item detail read models

use crate::error::ClashCompareError;
use crate::rating::Tier;
use crate::store::{rank_of, ItemStore};
use crate::types::{Category, ItemId, RatedItem};
use serde::{Deserialize, Serialize};

/// One row of a category leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position in the full ordering, before any search filter
    pub rank: usize,
    pub tier: Tier,
    pub total_votes: u64,
    /// Wins as a percentage of all votes, 0 when unvoted
    pub win_rate: f64,
    #[serde(flatten)]
    pub item: RatedItem,
}

/// Everything shown on an item's detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetails {
    /// One more than the number of strictly better rated items
    pub rank: usize,
    pub tier: Tier,
    pub total_votes: u64,
    pub win_rate: f64,
    #[serde(flatten)]
    pub item: RatedItem,
}

/// Rank items that are already sorted by rating (descending), then keep the
/// rows whose name contains `search`, ignoring case
pub fn rank_items(items: Vec<RatedItem>, search: Option<&str>) -> Vec<LeaderboardEntry> {
    let needle = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| LeaderboardEntry {
            rank: index + 1,
            tier: Tier::from_rating(item.rating),
            total_votes: item.total_votes(),
            win_rate: item.win_rate(),
            item,
        })
        .filter(|entry| match &needle {
            Some(needle) => entry.item.name.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .collect()
}

pub async fn leaderboard(
    store: &dyn ItemStore,
    category: Category,
    search: Option<&str>,
) -> crate::error::Result<Vec<LeaderboardEntry>> {
    let items = store.list_by_rating(category).await?;
    Ok(rank_items(items, search))
}

pub async fn item_details(
    store: &dyn ItemStore,
    category: Category,
    item_id: ItemId,
) -> crate::error::Result<ItemDetails> {
    let item = store
        .get_item(category, item_id)
        .await?
        .ok_or(ClashCompareError::ItemNotFound { category, item_id })?;
    let rank = rank_of(store, category, &item).await?;

    Ok(ItemDetails {
        rank,
        tier: Tier::from_rating(item.rating),
        total_votes: item.total_votes(),
        win_rate: item.win_rate(),
        item,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryItemStore;
    use crate::types::ItemResult;

    fn store() -> InMemoryItemStore {
        let store = InMemoryItemStore::default();
        let mut golem = RatedItem::new(0, Category::Cards, "Golem").with_rating(1310.0);
        golem.apply_result(0.0, ItemResult::Win);
        golem.apply_result(0.0, ItemResult::Win);
        golem.apply_result(0.0, ItemResult::Loss);
        golem.apply_result(0.0, ItemResult::Draw);

        store
            .insert_items(vec![
                golem,
                RatedItem::new(1, Category::Cards, "Ice Golem").with_rating(1150.0),
                RatedItem::new(2, Category::Cards, "Goblin Barrel").with_rating(1150.0),
                RatedItem::new(3, Category::Cards, "Zap").with_rating(790.0),
            ])
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_leaderboard_order_and_tiers() {
        let store = store();
        let rows = leaderboard(&store, Category::Cards, None).await.unwrap();

        let summary: Vec<_> = rows
            .iter()
            .map(|row| (row.rank, row.item.name.as_str(), row.tier))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "Golem", Tier::SPlus),
                (2, "Ice Golem", Tier::A),
                (3, "Goblin Barrel", Tier::A),
                (4, "Zap", Tier::F),
            ]
        );
        assert_eq!(rows[0].total_votes, 4);
        assert_eq!(rows[0].win_rate, 50.0);
        assert_eq!(rows[3].win_rate, 0.0);
    }

    #[tokio::test]
    async fn test_search_keeps_full_ranking() {
        let store = store();

        let rows = leaderboard(&store, Category::Cards, Some("GOLEM")).await.unwrap();
        let ranks: Vec<_> = rows.iter().map(|row| row.rank).collect();
        assert_eq!(ranks, vec![1, 2]);

        let rows = leaderboard(&store, Category::Cards, Some("barrel")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rank, 3);

        let rows = leaderboard(&store, Category::Cards, Some("   ")).await.unwrap();
        assert_eq!(rows.len(), 4);

        let rows = leaderboard(&store, Category::Emotes, None).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_item_details_use_competition_rank() {
        let store = store();

        let barrel = item_details(&store, Category::Cards, 2).await.unwrap();
        assert_eq!(barrel.rank, 2);
        let ice_golem = item_details(&store, Category::Cards, 1).await.unwrap();
        assert_eq!(ice_golem.rank, 2);

        let zap = item_details(&store, Category::Cards, 3).await.unwrap();
        assert_eq!(zap.rank, 4);
        assert_eq!(zap.tier, Tier::F);

        assert!(item_details(&store, Category::Emotes, 2).await.is_err());
    }
}
