//! Write operations for the full-replace rebuild.
//!
//! Callers own the transaction: these functions run on whatever connection
//! or transaction they are handed and never commit on their own.

use rusqlite::{Connection, params};
use tcg_catalog::types::{PersistedCard, PersistedCardSearch, PersistedSeries, PersistedSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Delete every persisted row: cards, search rows, sets, then series.
pub fn clear_store(conn: &Connection) -> Result<(), OperationError> {
    conn.execute_batch(
        "DELETE FROM cards;
         DELETE FROM card_search;
         DELETE FROM sets;
         DELETE FROM series;",
    )?;
    Ok(())
}

// ── Batched Inserts ─────────────────────────────────────────────────────────

pub fn insert_series(conn: &Connection, rows: &[PersistedSeries]) -> Result<usize, OperationError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO series (id, name_de, name_en, name_fr) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for row in rows {
        stmt.execute(params![row.id, row.name_de, row.name_en, row.name_fr])?;
    }
    Ok(rows.len())
}

/// Insert sets. Every referenced series must already exist.
pub fn insert_sets(conn: &Connection, rows: &[PersistedSet]) -> Result<usize, OperationError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO sets (id, name_de, name_en, name_fr, code, abbreviation, official, total,
                           release_date, cardmarket_id, tcgplayer_id, series_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )?;
    for row in rows {
        stmt.execute(params![
            row.id,
            row.name_de,
            row.name_en,
            row.name_fr,
            row.code,
            row.abbreviation,
            row.official,
            row.total,
            row.release_date,
            row.cardmarket_id,
            row.tcgplayer_id,
            row.series_id,
        ])?;
    }
    Ok(rows.len())
}

/// Insert cards. Every referenced set must already exist.
pub fn insert_cards(conn: &Connection, rows: &[PersistedCard]) -> Result<usize, OperationError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO cards (id, set_id, number, name_de, name_en, name_fr, code,
                            cardmarket_id, tcgplayer_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for row in rows {
        stmt.execute(params![
            row.id,
            row.set_id,
            row.number,
            row.name_de,
            row.name_en,
            row.name_fr,
            row.code,
            row.cardmarket_id,
            row.tcgplayer_id,
        ])?;
    }
    Ok(rows.len())
}

pub fn insert_search_rows(
    conn: &Connection,
    rows: &[PersistedCardSearch],
) -> Result<usize, OperationError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO card_search (id, set_id, code, names) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for row in rows {
        stmt.execute(params![row.id, row.set_id, row.code, row.names])?;
    }
    Ok(rows.len())
}
