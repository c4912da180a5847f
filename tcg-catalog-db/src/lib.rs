//! SQLite persistence layer for the card catalog.
//!
//! Provides schema creation, the batched full-replace write operations, and
//! read-back queries backed by SQLite (via rusqlite with bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{
    OperationError, clear_store, insert_cards, insert_search_rows, insert_series, insert_sets,
};
pub use queries::{
    StoreStats, find_card_by_code, load_cards, load_search_rows, load_series, load_sets,
    store_stats,
};
pub use schema::{SchemaError, open_database, open_memory};
