//! Seed catalog loading
//!
//! Items are created outside the voting flow. A catalog lists the cards and
//! emotes to rate; every entry starts at the initial rating with zeroed
//! counters, and cards that have an evolution get a second entry for it.

use crate::error::ClashCompareError;
use crate::store::InMemoryItemStore;
use crate::types::{Category, ItemId, RatedItem};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedEntry {
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub elixir_cost: Option<u32>,
    /// Present when the card also has an evolved form
    #[serde(default)]
    pub evolution_image_url: Option<String>,
}

/// Cards and emotes to load into the store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedCatalog {
    #[serde(default)]
    pub cards: Vec<SeedEntry>,
    #[serde(default)]
    pub emotes: Vec<SeedEntry>,
}

/// Counts of items created per category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub cards: usize,
    pub emotes: usize,
}

impl SeedCatalog {
    pub fn from_json(contents: &str) -> crate::error::Result<Self> {
        serde_json::from_str(contents).map_err(|e| {
            ClashCompareError::SeedError {
                message: format!("invalid catalog: {}", e),
            }
            .into()
        })
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ClashCompareError::SeedError {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_json(&contents)
    }

    fn entries(&self, category: Category) -> &[SeedEntry] {
        match category {
            Category::Cards => &self.cards,
            Category::Emotes => &self.emotes,
        }
    }

    /// Build the rated items for a category. Ids are assigned sequentially
    /// from 0 in catalog order, evolutions directly after their base card.
    pub fn items(
        &self,
        category: Category,
        initial_rating: f64,
    ) -> crate::error::Result<Vec<RatedItem>> {
        let mut items = Vec::new();
        let mut next_id: ItemId = 0;

        for entry in self.entries(category) {
            let name = entry.name.trim();
            if name.is_empty() {
                return Err(ClashCompareError::SeedError {
                    message: format!("{} entry #{} has an empty name", category, next_id),
                }
                .into());
            }

            let elixir_cost = match category {
                Category::Cards => entry.elixir_cost,
                Category::Emotes => None,
            };

            items.push(
                RatedItem::new(next_id, category, name)
                    .with_rating(initial_rating)
                    .with_image_url(entry.image_url.clone())
                    .with_elixir_cost(elixir_cost),
            );
            next_id += 1;

            if let (Category::Cards, Some(evolution_url)) =
                (category, entry.evolution_image_url.as_ref())
            {
                items.push(
                    RatedItem::new(next_id, category, format!("{} Evolution", name))
                        .with_rating(initial_rating)
                        .with_image_url(evolution_url.clone())
                        .with_elixir_cost(elixir_cost),
                );
                next_id += 1;
            }
        }

        Ok(items)
    }
}

/// Load every category of `catalog` into `store`
pub fn seed_store(
    store: &InMemoryItemStore,
    catalog: &SeedCatalog,
    initial_rating: f64,
) -> crate::error::Result<SeedSummary> {
    let cards = catalog.items(Category::Cards, initial_rating)?;
    let emotes = catalog.items(Category::Emotes, initial_rating)?;
    let summary = SeedSummary {
        cards: cards.len(),
        emotes: emotes.len(),
    };

    store.insert_items(cards)?;
    store.insert_items(emotes)?;

    info!(
        "Seeded item store with {} cards and {} emotes",
        summary.cards, summary.emotes
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ItemStore;

    const CATALOG: &str = r#"{
        "cards": [
            {"name": "Knight", "image_url": "knight.png", "elixir_cost": 3, "evolution_image_url": "knight-evo.png"},
            {"name": "Fireball", "image_url": "fireball.png", "elixir_cost": 4}
        ],
        "emotes": [
            {"name": "Laughing King", "image_url": "laugh.png", "elixir_cost": 9}
        ]
    }"#;

    #[test]
    fn test_evolutions_follow_base_card() {
        let catalog = SeedCatalog::from_json(CATALOG).unwrap();
        let cards = catalog.items(Category::Cards, 1000.0).unwrap();

        let names: Vec<_> = cards.iter().map(|c| (c.id, c.name.as_str())).collect();
        assert_eq!(
            names,
            vec![(0, "Knight"), (1, "Knight Evolution"), (2, "Fireball")]
        );
        assert_eq!(cards[1].image_url, "knight-evo.png");
        assert_eq!(cards[1].elixir_cost, Some(3));
        assert!(cards.iter().all(|c| c.rating == 1000.0 && c.total_votes() == 0));
    }

    #[test]
    fn test_emotes_have_no_elixir_cost() {
        let catalog = SeedCatalog::from_json(CATALOG).unwrap();
        let emotes = catalog.items(Category::Emotes, 1000.0).unwrap();
        assert_eq!(emotes.len(), 1);
        assert_eq!(emotes[0].elixir_cost, None);
    }

    #[test]
    fn test_rejects_bad_catalogs() {
        assert!(SeedCatalog::from_json("not json").is_err());

        let catalog = SeedCatalog::from_json(r#"{"cards": [{"name": "  "}]}"#).unwrap();
        assert!(catalog.items(Category::Cards, 1000.0).is_err());
    }

    #[tokio::test]
    async fn test_seed_store() {
        let store = InMemoryItemStore::default();
        let catalog = SeedCatalog::from_json(CATALOG).unwrap();

        let summary = seed_store(&store, &catalog, 1000.0).unwrap();
        assert_eq!(summary, SeedSummary { cards: 3, emotes: 1 });
        assert_eq!(store.item_count(Category::Cards).await.unwrap(), 3);
        assert_eq!(store.item_count(Category::Emotes).await.unwrap(), 1);
    }
}
