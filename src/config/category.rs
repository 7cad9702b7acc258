//! Category to storage mapping
//!
//! The API speaks in categories ("cards", "emotes"); the store keeps items in a
//! per-category table and tags vote rows with an entity type. The mapping is a
//! plain value handed to the store, not process-wide state.

use crate::types::Category;

/// Storage identifiers for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTable {
    /// Table holding the rated items
    pub items_table: &'static str,
    /// Value written to the `entity_type` column of vote rows
    pub entity_type: &'static str,
}

/// Mapping for every category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTables {
    pub cards: CategoryTable,
    pub emotes: CategoryTable,
}

/// The mapping used by the hosted schema
pub const DEFAULT_CATEGORY_TABLES: CategoryTables = CategoryTables {
    cards: CategoryTable {
        items_table: "cards",
        entity_type: "card",
    },
    emotes: CategoryTable {
        items_table: "emotes",
        entity_type: "emote",
    },
};

impl CategoryTables {
    pub fn table(&self, category: Category) -> &CategoryTable {
        match category {
            Category::Cards => &self.cards,
            Category::Emotes => &self.emotes,
        }
    }

    pub fn items_table(&self, category: Category) -> &'static str {
        self.table(category).items_table
    }

    pub fn entity_type(&self, category: Category) -> &'static str {
        self.table(category).entity_type
    }
}

impl Default for CategoryTables {
    fn default() -> Self {
        DEFAULT_CATEGORY_TABLES
    }
}
