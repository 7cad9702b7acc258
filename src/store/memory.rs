//! In-memory item store
//!
//! Stands in for the hosted database. Recording a vote applies the rating
//! update with the shared engine under a single write lock, which is what the
//! database trigger does on the server of record.

use crate::config::CategoryTables;
use crate::error::ClashCompareError;
use crate::rating::elo;
use crate::store::ItemStore;
use crate::types::{Category, ItemId, RatedItem, RatingDelta, VoteRecord};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use tracing::debug;

type Table = BTreeMap<ItemId, RatedItem>;

/// In-memory rated item storage
#[derive(Debug)]
pub struct InMemoryItemStore {
    tables: CategoryTables,
    items: RwLock<HashMap<&'static str, Table>>,
    votes: RwLock<Vec<VoteRecord>>,
}

fn read_lock_error() -> ClashCompareError {
    ClashCompareError::InternalError {
        message: "Failed to acquire items read lock".to_string(),
    }
}

fn write_lock_error() -> ClashCompareError {
    ClashCompareError::InternalError {
        message: "Failed to acquire items write lock".to_string(),
    }
}

impl InMemoryItemStore {
    /// Create an empty store using the given category mapping
    pub fn new(tables: CategoryTables) -> Self {
        let items = Category::ALL
            .iter()
            .map(|category| (tables.items_table(*category), Table::new()))
            .collect();

        Self {
            tables,
            items: RwLock::new(items),
            votes: RwLock::new(Vec::new()),
        }
    }

    /// Category mapping this store was built with
    pub fn tables(&self) -> &CategoryTables {
        &self.tables
    }

    /// Insert or replace an item in its category's table
    pub fn insert_item(&self, item: RatedItem) -> crate::error::Result<()> {
        self.insert_items(vec![item])
    }

    /// Insert or replace several items
    pub fn insert_items(&self, items: Vec<RatedItem>) -> crate::error::Result<()> {
        let mut tables = self.items.write().map_err(|_| write_lock_error())?;

        for item in items {
            let table_name = self.tables.items_table(item.category);
            tables
                .entry(table_name)
                .or_default()
                .insert(item.id, item);
        }

        Ok(())
    }

    /// Every vote recorded so far, oldest first
    pub fn votes(&self) -> crate::error::Result<Vec<VoteRecord>> {
        let votes = self.votes.read().map_err(|_| {
            ClashCompareError::InternalError {
                message: "Failed to acquire votes read lock".to_string(),
            }
        })?;

        Ok(votes.clone())
    }

    pub fn vote_count(&self) -> crate::error::Result<usize> {
        let votes = self.votes.read().map_err(|_| {
            ClashCompareError::InternalError {
                message: "Failed to acquire votes read lock".to_string(),
            }
        })?;

        Ok(votes.len())
    }

    fn with_table<T>(
        &self,
        category: Category,
        f: impl FnOnce(&Table) -> T,
    ) -> crate::error::Result<T> {
        let tables = self.items.read().map_err(|_| read_lock_error())?;
        let table_name = self.tables.items_table(category);

        match tables.get(table_name) {
            Some(table) => Ok(f(table)),
            None => Ok(f(&Table::new())),
        }
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new(CategoryTables::default())
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn list_ids(&self, category: Category) -> crate::error::Result<Vec<ItemId>> {
        self.with_table(category, |table| table.keys().copied().collect())
    }

    async fn get_item(
        &self,
        category: Category,
        item_id: ItemId,
    ) -> crate::error::Result<Option<RatedItem>> {
        self.with_table(category, |table| table.get(&item_id).cloned())
    }

    async fn count_rated_above(
        &self,
        category: Category,
        rating: f64,
    ) -> crate::error::Result<usize> {
        self.with_table(category, |table| {
            table.values().filter(|item| item.rating > rating).count()
        })
    }

    async fn list_by_rating(&self, category: Category) -> crate::error::Result<Vec<RatedItem>> {
        let mut items: Vec<RatedItem> =
            self.with_table(category, |table| table.values().cloned().collect())?;

        // Sort by rating (descending), ties by id
        items.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });

        Ok(items)
    }

    async fn item_count(&self, category: Category) -> crate::error::Result<usize> {
        self.with_table(category, |table| table.len())
    }

    async fn record_vote(
        &self,
        category: Category,
        vote: VoteRecord,
    ) -> crate::error::Result<[RatingDelta; 2]> {
        let outcome = vote.outcome();

        if outcome.winner_item_id == outcome.loser_item_id {
            return Err(ClashCompareError::InvalidVote {
                reason: "an item cannot be compared with itself".to_string(),
            }
            .into());
        }

        let expected_entity = self.tables.entity_type(category);
        if vote.entity_type != expected_entity {
            return Err(ClashCompareError::InvalidVote {
                reason: format!(
                    "entity type '{}' does not match category {} ('{}')",
                    vote.entity_type, category, expected_entity
                ),
            }
            .into());
        }

        let mut tables = self.items.write().map_err(|_| write_lock_error())?;
        let table = tables
            .get_mut(self.tables.items_table(category))
            .ok_or(ClashCompareError::ItemNotFound {
                category,
                item_id: outcome.winner_item_id,
            })?;

        let rating_of = |table: &Table, item_id: ItemId| {
            table
                .get(&item_id)
                .map(|item| item.rating)
                .ok_or(ClashCompareError::ItemNotFound { category, item_id })
        };
        let winner_rating = rating_of(&*table, outcome.winner_item_id)?;
        let loser_rating = rating_of(&*table, outcome.loser_item_id)?;

        let deltas = elo::deltas_for(&outcome, winner_rating, loser_rating);
        let (winner_result, loser_result) = outcome.results();

        for (delta, result) in deltas.iter().zip([winner_result, loser_result]) {
            if let Some(item) = table.get_mut(&delta.item_id) {
                item.apply_result(delta.delta, result);
            }
        }

        debug!(
            "Applied vote {} in {}: {} {:+.3}, {} {:+.3} (draw: {})",
            vote.id,
            category,
            deltas[0].item_id,
            deltas[0].delta,
            deltas[1].item_id,
            deltas[1].delta,
            vote.is_draw
        );

        let mut votes = self.votes.write().map_err(|_| {
            ClashCompareError::InternalError {
                message: "Failed to acquire votes write lock".to_string(),
            }
        })?;
        votes.push(vote);

        Ok(deltas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{current_timestamp, generate_vote_id};

    fn create_test_store() -> InMemoryItemStore {
        let store = InMemoryItemStore::default();
        store
            .insert_items(vec![
                RatedItem::new(0, Category::Cards, "Knight"),
                RatedItem::new(1, Category::Cards, "Archers").with_rating(1200.0),
                RatedItem::new(2, Category::Cards, "Goblins").with_rating(900.0),
                RatedItem::new(0, Category::Emotes, "Laughing King").with_rating(1100.0),
            ])
            .unwrap();
        store
    }

    fn vote(winner_id: ItemId, loser_id: ItemId, is_draw: bool, entity_type: &str) -> VoteRecord {
        VoteRecord {
            id: generate_vote_id(),
            winner_id,
            loser_id,
            is_draw,
            entity_type: entity_type.to_string(),
            created_at: current_timestamp(),
        }
    }

    #[tokio::test]
    async fn test_categories_are_isolated() {
        let store = create_test_store();

        assert_eq!(store.list_ids(Category::Cards).await.unwrap(), vec![0, 1, 2]);
        assert_eq!(store.list_ids(Category::Emotes).await.unwrap(), vec![0]);

        let emote = store.get_item(Category::Emotes, 0).await.unwrap().unwrap();
        assert_eq!(emote.name, "Laughing King");
        assert!(store.get_item(Category::Emotes, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rank_queries() {
        let store = create_test_store();

        assert_eq!(store.count_rated_above(Category::Cards, 1200.0).await.unwrap(), 0);
        assert_eq!(store.count_rated_above(Category::Cards, 1000.0).await.unwrap(), 1);
        assert_eq!(store.count_rated_above(Category::Cards, 0.0).await.unwrap(), 3);

        let ordered = store.list_by_rating(Category::Cards).await.unwrap();
        let names: Vec<_> = ordered.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["Archers", "Knight", "Goblins"]);
    }

    #[tokio::test]
    async fn test_decisive_vote_updates_ratings_and_counters() {
        let store = create_test_store();
        store.insert_item(RatedItem::new(3, Category::Cards, "Valkyrie")).unwrap();

        let deltas = store
            .record_vote(Category::Cards, vote(0, 3, false, "card"))
            .await
            .unwrap();
        assert_eq!(deltas[0].delta, 16.0);
        assert_eq!(deltas[1].delta, -16.0);

        let winner = store.get_item(Category::Cards, 0).await.unwrap().unwrap();
        let loser = store.get_item(Category::Cards, 3).await.unwrap().unwrap();
        assert_eq!(winner.rating, 1016.0);
        assert_eq!(loser.rating, 984.0);
        assert_eq!((winner.wins, winner.losses, winner.draws), (1, 0, 0));
        assert_eq!((loser.wins, loser.losses, loser.draws), (0, 1, 0));

        assert_eq!(store.votes().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_draw_updates_draw_counters() {
        let store = create_test_store();

        let deltas = store
            .record_vote(Category::Cards, vote(1, 0, true, "card"))
            .await
            .unwrap();
        assert!(deltas[0].delta < 0.0);
        assert!(deltas[1].delta > 0.0);

        let favourite = store.get_item(Category::Cards, 1).await.unwrap().unwrap();
        let underdog = store.get_item(Category::Cards, 0).await.unwrap().unwrap();
        assert_eq!(favourite.draws, 1);
        assert_eq!(underdog.draws, 1);
        assert_eq!(favourite.wins + favourite.losses, 0);
        assert!((favourite.rating + underdog.rating - 2200.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_invalid_votes_leave_store_untouched() {
        let store = create_test_store();

        // Same item on both sides
        assert!(store
            .record_vote(Category::Cards, vote(1, 1, false, "card"))
            .await
            .is_err());

        // Unknown loser
        assert!(store
            .record_vote(Category::Cards, vote(1, 42, false, "card"))
            .await
            .is_err());

        // Entity type from the other category
        assert!(store
            .record_vote(Category::Cards, vote(1, 0, false, "emote"))
            .await
            .is_err());

        let archers = store.get_item(Category::Cards, 1).await.unwrap().unwrap();
        assert_eq!(archers.rating, 1200.0);
        assert_eq!(archers.total_votes(), 0);
        assert!(store.votes().unwrap().is_empty());
    }
}
