//! Rated item storage
//!
//! This module defines the item store interface the voting flow consumes, an
//! in-memory implementation that applies votes with the shared rating engine,
//! and catalog seeding.

pub mod item_store;
pub mod memory;
pub mod seed;

// Re-export commonly used types
pub use item_store::{rank_of, ItemStore};
pub use memory::InMemoryItemStore;
pub use seed::{seed_store, SeedCatalog, SeedEntry, SeedSummary};
