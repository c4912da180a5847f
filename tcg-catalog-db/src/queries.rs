//! Read-back queries for the catalog store.
//!
//! All listings are ordered by primary key so that two stores holding the
//! same rows compare equal.

use rusqlite::{Connection, Row};
use tcg_catalog::types::{PersistedCard, PersistedCardSearch, PersistedSeries, PersistedSet};

use crate::operations::OperationError;
use crate::schema;

pub fn load_series(conn: &Connection) -> Result<Vec<PersistedSeries>, OperationError> {
    let mut stmt = conn.prepare("SELECT id, name_de, name_en, name_fr FROM series ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(PersistedSeries {
            id: row.get(0)?,
            name_de: row.get(1)?,
            name_en: row.get(2)?,
            name_fr: row.get(3)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn load_sets(conn: &Connection) -> Result<Vec<PersistedSet>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, name_de, name_en, name_fr, code, abbreviation, official, total,
                release_date, cardmarket_id, tcgplayer_id, series_id
         FROM sets ORDER BY id",
    )?;
    let rows = stmt.query_map([], row_to_set)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn load_cards(conn: &Connection) -> Result<Vec<PersistedCard>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, set_id, number, name_de, name_en, name_fr, code, cardmarket_id, tcgplayer_id
         FROM cards ORDER BY set_id, id",
    )?;
    let rows = stmt.query_map([], row_to_card)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn load_search_rows(conn: &Connection) -> Result<Vec<PersistedCardSearch>, OperationError> {
    let mut stmt =
        conn.prepare("SELECT id, set_id, code, names FROM card_search ORDER BY set_id, id")?;
    let rows = stmt.query_map([], |row| {
        Ok(PersistedCardSearch {
            id: row.get(0)?,
            set_id: row.get(1)?,
            code: row.get(2)?,
            names: row.get(3)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Look up one card by its composed code, e.g. `"P1 12"`.
pub fn find_card_by_code(
    conn: &Connection,
    code: &str,
) -> Result<Option<PersistedCard>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, set_id, number, name_de, name_en, name_fr, code, cardmarket_id, tcgplayer_id
         FROM cards WHERE code = ?1 ORDER BY set_id, id LIMIT 1",
    )?;
    match stmt.query_row([code], row_to_card) {
        Ok(card) => Ok(Some(card)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn row_to_set(row: &Row) -> rusqlite::Result<PersistedSet> {
    Ok(PersistedSet {
        id: row.get(0)?,
        name_de: row.get(1)?,
        name_en: row.get(2)?,
        name_fr: row.get(3)?,
        code: row.get(4)?,
        abbreviation: row.get(5)?,
        official: row.get(6)?,
        total: row.get(7)?,
        release_date: row.get(8)?,
        cardmarket_id: row.get(9)?,
        tcgplayer_id: row.get(10)?,
        series_id: row.get(11)?,
    })
}

fn row_to_card(row: &Row) -> rusqlite::Result<PersistedCard> {
    Ok(PersistedCard {
        id: row.get(0)?,
        set_id: row.get(1)?,
        number: row.get(2)?,
        name_de: row.get(3)?,
        name_en: row.get(4)?,
        name_fr: row.get(5)?,
        code: row.get(6)?,
        cardmarket_id: row.get(7)?,
        tcgplayer_id: row.get(8)?,
    })
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Row counts per persisted table.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub series: i64,
    pub sets: i64,
    pub cards: i64,
    pub search_rows: i64,
    pub schema_version: i32,
}

pub fn store_stats(conn: &Connection) -> Result<StoreStats, OperationError> {
    let series: i64 = conn.query_row("SELECT COUNT(*) FROM series", [], |r| r.get(0))?;
    let sets: i64 = conn.query_row("SELECT COUNT(*) FROM sets", [], |r| r.get(0))?;
    let cards: i64 = conn.query_row("SELECT COUNT(*) FROM cards", [], |r| r.get(0))?;
    let search_rows: i64 = conn.query_row("SELECT COUNT(*) FROM card_search", [], |r| r.get(0))?;
    let schema_version = match schema::schema_version(conn) {
        Ok(v) => v,
        Err(schema::SchemaError::Sqlite(e)) => return Err(e.into()),
        Err(schema::SchemaError::VersionMismatch { found, .. }) => found,
    };

    Ok(StoreStats {
        series,
        sets,
        cards,
        search_rows,
        schema_version,
    })
}
