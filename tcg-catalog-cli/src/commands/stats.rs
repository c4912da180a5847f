use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;
use crate::settings::Settings;

use super::open_store;

pub(crate) fn run_stats(settings: &Settings, db: Option<PathBuf>) -> Result<(), CliError> {
    let db_path = db.unwrap_or_else(|| settings.database_path.clone());

    if !db_path.exists() {
        log::warn!("No catalog database found at {}", db_path.display());
        log::info!("Run 'tcg-catalog build' to create one.");
        return Ok(());
    }

    let conn = open_store(&db_path)?;
    let stats = tcg_catalog_db::store_stats(&conn)
        .map_err(|e| CliError::database(format!("Failed to query catalog stats: {}", e)))?;

    log::info!(
        "{}",
        "Catalog Database Statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Database: {}", db_path.display());
    crate::log_blank();
    log::info!("  Series:         {:>8}", stats.series);
    log::info!("  Sets:           {:>8}", stats.sets);
    log::info!("  Cards:          {:>8}", stats.cards);
    log::info!("  Search rows:    {:>8}", stats.search_rows);
    log::info!("  Schema version: {:>8}", stats.schema_version);

    Ok(())
}
