pub(crate) mod build;
pub(crate) mod config;
pub(crate) mod stats;

use std::path::Path;

use rusqlite::Connection;

use crate::CliError;

/// Open (creating if needed) the catalog database at `path`.
pub(crate) fn open_store(path: &Path) -> Result<Connection, CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    tcg_catalog_db::open_database(path).map_err(|e| {
        CliError::database(format!(
            "Failed to open catalog database at {}: {}",
            path.display(),
            e
        ))
    })
}
