//! Test fixtures and store wrappers for integration testing

#![allow(dead_code)]

use async_trait::async_trait;
use clash_compare::config::AppConfig;
use clash_compare::error::{ClashCompareError, Result};
use clash_compare::service::AppState;
use clash_compare::store::{seed_store, InMemoryItemStore, ItemStore, SeedCatalog};
use clash_compare::types::{Category, ItemId, RatedItem, RatingDelta, VoteRecord};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Small catalog with one evolution card
pub const CATALOG: &str = r#"{
    "cards": [
        {"name": "Knight", "image_url": "https://cdn.example/knight.png", "elixir_cost": 3,
         "evolution_image_url": "https://cdn.example/knight-evo.png"},
        {"name": "Archers", "image_url": "https://cdn.example/archers.png", "elixir_cost": 3},
        {"name": "Hog Rider", "image_url": "https://cdn.example/hog.png", "elixir_cost": 4},
        {"name": "P.E.K.K.A", "image_url": "https://cdn.example/pekka.png", "elixir_cost": 7},
        {"name": "The Log", "image_url": "https://cdn.example/log.png", "elixir_cost": 2}
    ],
    "emotes": [
        {"name": "Laughing King", "image_url": "https://cdn.example/laugh.png"},
        {"name": "Crying Goblin", "image_url": "https://cdn.example/cry.png"},
        {"name": "Thumbs Up", "image_url": "https://cdn.example/thumbs.png"}
    ]
}"#;

/// In-memory store loaded with `CATALOG` at the default rating
pub fn seeded_store() -> Arc<InMemoryItemStore> {
    let store = InMemoryItemStore::default();
    let catalog = SeedCatalog::from_json(CATALOG).expect("fixture catalog parses");
    seed_store(&store, &catalog, 1000.0).expect("fixture catalog seeds");
    Arc::new(store)
}

/// Configuration with no settle delay so tests do not sleep
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.voting.settle_delay_ms = 0;
    config
}

/// Started application around `store`
pub async fn running_app(store: Arc<InMemoryItemStore>) -> Arc<AppState> {
    let app_state = AppState::with_store(test_config(), store).expect("app state builds");
    app_state.start().await.expect("app state starts");
    Arc::new(app_state)
}

/// Store wrapper whose reads can be made to fail, to exercise the
/// read-back-after-recording path
pub struct FlakyStore {
    inner: Arc<InMemoryItemStore>,
    fail_reads: AtomicBool,
    reads: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: Arc<InMemoryItemStore>) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check_read(&self) -> Result<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ClashCompareError::StoreUnavailable {
                message: "simulated read timeout".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl ItemStore for FlakyStore {
    async fn list_ids(&self, category: Category) -> Result<Vec<ItemId>> {
        self.check_read()?;
        self.inner.list_ids(category).await
    }

    async fn get_item(&self, category: Category, item_id: ItemId) -> Result<Option<RatedItem>> {
        self.check_read()?;
        self.inner.get_item(category, item_id).await
    }

    async fn count_rated_above(&self, category: Category, rating: f64) -> Result<usize> {
        self.check_read()?;
        self.inner.count_rated_above(category, rating).await
    }

    async fn list_by_rating(&self, category: Category) -> Result<Vec<RatedItem>> {
        self.check_read()?;
        self.inner.list_by_rating(category).await
    }

    async fn item_count(&self, category: Category) -> Result<usize> {
        self.check_read()?;
        self.inner.item_count(category).await
    }

    async fn record_vote(&self, category: Category, vote: VoteRecord) -> Result<[RatingDelta; 2]> {
        self.inner.record_vote(category, vote).await
    }
}
