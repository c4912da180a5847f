//! Normalize a canonical catalog into store rows and rebuild the store.
//!
//! Rows are created card by card: the first card of a set persists the set,
//! and the first set of a series finds or creates the series. Sets without
//! cards are therefore not stored. The whole delete and rewrite runs in one
//! transaction, so readers see either the previous store or the new one.

use std::collections::BTreeSet;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tcg_catalog::types::{
    CanonicalCatalog, CanonicalSet, PersistedCard, PersistedCardSearch, PersistedSeries,
    PersistedSet, PropertyMap,
};
use tcg_catalog_db::operations::{self, OperationError};
use thiserror::Error;

use crate::progress::PipelineProgress;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Every row of one rebuild, in insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoreRows {
    pub series: Vec<PersistedSeries>,
    pub sets: Vec<PersistedSet>,
    pub cards: Vec<PersistedCard>,
    pub search: Vec<PersistedCardSearch>,
    /// Cards whose owning set is not in the catalog.
    pub skipped_cards: usize,
}

/// Row counts written by one rebuild.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PersistStats {
    pub series: usize,
    pub sets: usize,
    pub cards: usize,
    pub search_rows: usize,
    pub skipped_cards: usize,
}

/// German, English and French names joined by single spaces.
pub fn search_names(de: &str, en: &str, fr: &str) -> String {
    format!("{} {} {}", de, en, fr)
}

fn provider_id(third_party: &PropertyMap, provider: &str) -> Option<String> {
    third_party
        .get(provider)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn set_row(set: &CanonicalSet) -> PersistedSet {
    PersistedSet {
        id: set.id.clone(),
        name_de: set.names.get("de").to_string(),
        name_en: set.names.get("en").to_string(),
        name_fr: set.names.get("fr").to_string(),
        code: set.code.clone(),
        abbreviation: set.abbreviation.clone(),
        official: set.official_count,
        total: set.total_count,
        release_date: set.release_date.clone(),
        cardmarket_id: provider_id(&set.third_party, "cardmarket"),
        tcgplayer_id: provider_id(&set.third_party, "tcgplayer"),
        series_id: set.series_id.clone(),
    }
}

/// Map a canonical catalog to store rows.
pub fn normalize(
    catalog: &CanonicalCatalog,
    progress: Option<&dyn PipelineProgress>,
) -> StoreRows {
    let mut rows = StoreRows::default();
    let mut persisted_sets: BTreeSet<&str> = BTreeSet::new();
    let mut persisted_series: BTreeSet<&str> = BTreeSet::new();
    let total = catalog.cards.len();

    for (index, ((set_id, _), card)) in catalog.cards.iter().enumerate() {
        let Some(set) = catalog.sets.get(set_id) else {
            log::warn!(
                "Card '{}' references unknown set '{}', skipping",
                card.id,
                set_id
            );
            rows.skipped_cards += 1;
            continue;
        };

        if persisted_sets.insert(set.id.as_str()) {
            if persisted_series.insert(set.series_id.as_str()) {
                let names = catalog
                    .series
                    .get(&set.series_id)
                    .map(|s| s.names.clone())
                    .unwrap_or_default();
                if names.is_empty() {
                    log::debug!("Creating series '{}' without names", set.series_id);
                }
                rows.series.push(PersistedSeries {
                    id: set.series_id.clone(),
                    name_de: names.get("de").to_string(),
                    name_en: names.get("en").to_string(),
                    name_fr: names.get("fr").to_string(),
                });
            }
            rows.sets.push(set_row(set));
        }

        let (de, en, fr) = (
            card.names.get("de"),
            card.names.get("en"),
            card.names.get("fr"),
        );
        rows.cards.push(PersistedCard {
            id: card.id.clone(),
            set_id: set.id.clone(),
            number: card.number.clone(),
            name_de: de.to_string(),
            name_en: en.to_string(),
            name_fr: fr.to_string(),
            code: card.code.clone(),
            cardmarket_id: provider_id(&card.third_party, "cardmarket"),
            tcgplayer_id: provider_id(&card.third_party, "tcgplayer"),
        });
        rows.search.push(PersistedCardSearch {
            id: card.id.clone(),
            set_id: set.id.clone(),
            code: card.number.clone(),
            names: search_names(de, en, fr),
        });

        if let Some(p) = progress {
            p.on_item(index + 1, total, &card.code);
        }
    }

    rows
}

/// Replace the whole store with the rows of `catalog`.
///
/// On any failure the transaction is rolled back and the previous store is
/// left untouched.
pub fn persist(
    conn: &Connection,
    catalog: &CanonicalCatalog,
    progress: Option<&dyn PipelineProgress>,
) -> Result<PersistStats, PersistError> {
    let rows = normalize(catalog, progress);

    // Dropping the transaction without a successful commit rolls it back
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let stats = write_rows(&tx, &rows)?;
    tx.commit()?;

    log::info!(
        "Persisted {} series, {} sets, {} cards",
        stats.series,
        stats.sets,
        stats.cards
    );
    Ok(stats)
}

fn write_rows(conn: &Connection, rows: &StoreRows) -> Result<PersistStats, PersistError> {
    operations::clear_store(conn)?;
    Ok(PersistStats {
        series: operations::insert_series(conn, &rows.series)?,
        sets: operations::insert_sets(conn, &rows.sets)?,
        cards: operations::insert_cards(conn, &rows.cards)?,
        search_rows: operations::insert_search_rows(conn, &rows.search)?,
        skipped_cards: rows.skipped_cards,
    })
}
