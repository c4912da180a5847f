//! SQLite schema creation and migration.

use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration error: expected version {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
}

/// Current schema version. Increment when adding migrations.
pub const CURRENT_VERSION: i32 = 2;

/// Create all tables and indexes if they don't exist.
///
/// This is idempotent: safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    set_schema_version(conn, CURRENT_VERSION)?;
    Ok(())
}

/// Open or create a catalog store at the given path.
pub fn open_database(path: &std::path::Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    let version = schema_version(&conn)?;
    if version == 0 {
        create_schema(&conn)?;
    } else if version != CURRENT_VERSION {
        migrate(&conn, version)?;
    }

    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// The current schema version, or 0 if no schema exists.
pub fn schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run migrations from `from_version` up to `CURRENT_VERSION`.
fn migrate(conn: &Connection, from_version: i32) -> Result<(), SchemaError> {
    if from_version > CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: from_version,
        });
    }

    let mut version = from_version;
    while version < CURRENT_VERSION {
        if version == 1 {
            // Version 2 added marketplace ids to sets and cards
            conn.execute_batch(
                "ALTER TABLE sets ADD COLUMN cardmarket_id TEXT;
                 ALTER TABLE sets ADD COLUMN tcgplayer_id TEXT;
                 ALTER TABLE cards ADD COLUMN cardmarket_id TEXT;
                 ALTER TABLE cards ADD COLUMN tcgplayer_id TEXT;",
            )?;
        }
        version += 1;
        set_schema_version(conn, version)?;
    }

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Top-level grouping of sets
CREATE TABLE IF NOT EXISTS series (
    id TEXT PRIMARY KEY,
    name_de TEXT NOT NULL DEFAULT '',
    name_en TEXT NOT NULL DEFAULT '',
    name_fr TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS sets (
    id TEXT PRIMARY KEY,
    name_de TEXT NOT NULL DEFAULT '',
    name_en TEXT NOT NULL DEFAULT '',
    name_fr TEXT NOT NULL DEFAULT '',
    code TEXT NOT NULL,
    abbreviation TEXT NOT NULL DEFAULT '',
    official INTEGER,
    total INTEGER,
    release_date TEXT NOT NULL DEFAULT '',
    cardmarket_id TEXT,
    tcgplayer_id TEXT,
    series_id TEXT NOT NULL REFERENCES series(id)
);
CREATE INDEX IF NOT EXISTS idx_sets_series ON sets(series_id);

-- Card ids are only unique within their set
CREATE TABLE IF NOT EXISTS cards (
    id TEXT NOT NULL,
    set_id TEXT NOT NULL REFERENCES sets(id),
    number TEXT NOT NULL DEFAULT '',
    name_de TEXT NOT NULL DEFAULT '',
    name_en TEXT NOT NULL DEFAULT '',
    name_fr TEXT NOT NULL DEFAULT '',
    code TEXT NOT NULL,
    cardmarket_id TEXT,
    tcgplayer_id TEXT,
    PRIMARY KEY (set_id, id)
);
CREATE INDEX IF NOT EXISTS idx_cards_code ON cards(code);

-- Literal projection of card names for an external search index
CREATE TABLE IF NOT EXISTS card_search (
    id TEXT NOT NULL,
    set_id TEXT NOT NULL,
    code TEXT NOT NULL,
    names TEXT NOT NULL,
    PRIMARY KEY (set_id, id)
);
"#;
